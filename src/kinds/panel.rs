use crate::{
    render::element::Element,
    scene::{
        node::{Component, SceneNode, SceneState},
        state::{DataState, LayoutChildState},
    },
};

#[derive(Clone, Debug)]
pub struct VizPanelState {
    pub title: String,
    pub plugin_id: String,
    pub layout: LayoutChildState,
    /// Own query; without one the panel shows the nearest ancestor's data.
    pub data: Option<SceneNode<DataState>>,
}

impl SceneState for VizPanelState {
    fn data(&self) -> Option<&SceneNode<DataState>> {
        self.data.as_ref()
    }
}

pub struct VizPanel;

impl Component<VizPanelState> for VizPanel {
    fn kind(&self) -> &'static str {
        "panel"
    }

    fn render(&self, model: &SceneNode<VizPanelState>) -> Option<Element> {
        let state = model.use_state();
        let data = model.resolve_data();

        let mut el = Element::new("viz-panel")
            .key(state.layout.key.clone())
            .prop("title", state.title.clone())
            .prop("pluginId", state.plugin_id.clone())
            .prop("series", data.series_count());
        if let Some(panel) = &data.data {
            el = el.prop(
                "loading",
                serde_json::to_value(panel.state).unwrap_or_default(),
            );
        }
        if let Some(range) = model.resolve_time_range() {
            let range = range.time_range();
            el = el.prop("from", range.from.0).prop("to", range.to.0);
        }
        Some(el)
    }
}

pub fn viz_panel(state: VizPanelState) -> SceneNode<VizPanelState> {
    SceneNode::new(state, VizPanel)
}
