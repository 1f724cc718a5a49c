use std::io::Read;

use crate::{
    foundation::{
        core::{RawTimeRange, TimeRange, Timestamp},
        error::{DyndashError, DyndashResult},
    },
    kinds::{
        data::static_data,
        layout::{FlexDirection, FlexLayout, FlexLayoutState},
        panel::{VizPanelState, viz_panel},
        scene::{SceneRootState, scene},
        time_range::time_range_node,
    },
    scene::{
        node::{SceneNode, SceneRef},
        state::{DataFrame, DataState, LayoutChildState, Sizing},
    },
};

/// Declarative scene tree, as stored in dashboard JSON files.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneDescriptor {
    Scene {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_range: Option<RawTimeRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<DataDescriptor>,
        body: Box<SceneDescriptor>,
    },
    Flex {
        #[serde(default)]
        direction: FlexDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(default)]
        size: Sizing,
        #[serde(default)]
        children: Vec<SceneDescriptor>,
    },
    Panel {
        title: String,
        #[serde(default = "default_plugin")]
        plugin_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(default)]
        size: Sizing,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<DataDescriptor>,
    },
}

fn default_plugin() -> String {
    "timeseries".to_string()
}

/// Frames served by a static data provider.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataDescriptor {
    #[serde(default)]
    pub frames: Vec<DataFrame>,
}

impl SceneDescriptor {
    pub fn from_json_str(s: &str) -> DyndashResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader(r: impl Read) -> DyndashResult<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn to_json_pretty(&self) -> DyndashResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks: a scene only at the root, sane sizes, non-empty titles.
    pub fn validate(&self) -> DyndashResult<()> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> DyndashResult<()> {
        match self {
            SceneDescriptor::Scene { title, body, .. } => {
                if depth > 0 {
                    return Err(DyndashError::descriptor(format!(
                        "scene '{title}' must be the root of the tree"
                    )));
                }
                if title.trim().is_empty() {
                    return Err(DyndashError::descriptor("scene title must be non-empty"));
                }
                body.validate_at(depth + 1)
            }
            SceneDescriptor::Flex { size, children, .. } => {
                size.validate()?;
                children.iter().try_for_each(|c| c.validate_at(depth + 1))
            }
            SceneDescriptor::Panel {
                title,
                plugin_id,
                size,
                ..
            } => {
                if title.trim().is_empty() {
                    return Err(DyndashError::descriptor("panel title must be non-empty"));
                }
                if plugin_id.trim().is_empty() {
                    return Err(DyndashError::descriptor(format!(
                        "panel '{title}' has an empty plugin id"
                    )));
                }
                size.validate()
            }
        }
    }
}

/// Inputs to [`build_scene`] that are not part of the descriptor.
#[derive(Clone, Copy, Debug)]
pub struct BuildContext {
    /// Reference time for relative ranges like `now-6h`.
    pub now: Timestamp,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            now: Timestamp::now(),
        }
    }
}

/// Validate `desc` and build the live node tree it describes.
#[tracing::instrument(skip(desc))]
pub fn build_scene(desc: &SceneDescriptor, ctx: &BuildContext) -> DyndashResult<SceneRef> {
    desc.validate()?;
    let root = build_node(desc, ctx)?;
    tracing::debug!(root = %root.id(), kind = root.kind(), "scene built");
    Ok(root)
}

fn build_data(desc: &Option<DataDescriptor>) -> Option<SceneNode<DataState>> {
    desc.as_ref().map(|d| static_data(d.frames.clone()))
}

fn layout_child(key: &Option<String>, size: &Sizing) -> LayoutChildState {
    LayoutChildState {
        key: key.clone(),
        size: size.clone(),
    }
}

fn build_node(desc: &SceneDescriptor, ctx: &BuildContext) -> DyndashResult<SceneRef> {
    match desc {
        SceneDescriptor::Scene {
            title,
            time_range,
            data,
            body,
        } => {
            let time_range = time_range
                .as_ref()
                .map(|raw| TimeRange::from_raw(raw.clone(), ctx.now).map(time_range_node))
                .transpose()?;
            let root = scene(SceneRootState {
                title: title.clone(),
                body: build_node(body, ctx)?,
                time_range,
                data: build_data(data),
            });
            Ok(root.erase())
        }
        SceneDescriptor::Flex {
            direction,
            key,
            size,
            children,
        } => {
            let children = children
                .iter()
                .map(|c| build_node(c, ctx))
                .collect::<DyndashResult<Vec<_>>>()?;
            let node = SceneNode::new(
                FlexLayoutState {
                    direction: *direction,
                    layout: layout_child(key, size),
                    children,
                },
                FlexLayout,
            );
            Ok(node.erase())
        }
        SceneDescriptor::Panel {
            title,
            plugin_id,
            key,
            size,
            data,
        } => {
            let node = viz_panel(VizPanelState {
                title: title.clone(),
                plugin_id: plugin_id.clone(),
                layout: layout_child(key, size),
                data: build_data(data),
            });
            Ok(node.erase())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/descriptor.rs"]
mod tests;
