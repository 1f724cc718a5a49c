use crate::{
    foundation::{
        core::TimeRange,
        error::{DyndashError, DyndashResult},
    },
    scene::node::SceneState,
};

/// State published by a data provider and consumed by descendants through `resolve_data`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PanelData>,
}

impl SceneState for DataState {}

impl DataState {
    pub fn series_count(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.series.len())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    NotStarted,
    Loading,
    Streaming,
    Done,
    Error,
}

/// Query result as seen by panels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelData {
    pub state: LoadingState,
    pub series: Vec<DataFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataFrame {
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

impl DataFrame {
    /// Number of rows, taken from the longest field.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|f| f.values.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

/// State of a time-range provider.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRangeState {
    pub range: TimeRange,
}

impl SceneState for TimeRangeState {}

/// Placement of a node inside its parent layout.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutChildState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub size: Sizing,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sizing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_sizing: Option<SizingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_sizing: Option<SizingMode>,
}

impl Sizing {
    pub fn validate(&self) -> DyndashResult<()> {
        for (name, dim) in [("width", &self.width), ("height", &self.height)] {
            match dim {
                Some(Dimension::Px(v)) if !v.is_finite() || *v < 0.0 => {
                    return Err(DyndashError::validation(format!(
                        "{name} must be a finite, non-negative pixel count"
                    )));
                }
                Some(Dimension::Css(s)) if s.trim().is_empty() => {
                    return Err(DyndashError::validation(format!(
                        "{name} must not be an empty CSS size"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Either a pixel count or a CSS size string (`"50%"`, `"10rem"`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Px(f64),
    Css(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    Fill,
    Fixed,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
