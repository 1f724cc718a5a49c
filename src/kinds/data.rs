use crate::{
    render::element::Element,
    scene::{
        node::{Component, SceneNode},
        state::{DataFrame, DataState, LoadingState, PanelData},
    },
};

/// Data provider serving a fixed set of frames.
///
/// Starting it publishes the frames stamped with the time range in scope of the provider;
/// stopping it keeps the last result but marks an unfinished load as not started.
pub struct StaticData {
    frames: Vec<DataFrame>,
}

impl StaticData {
    pub fn new(frames: Vec<DataFrame>) -> Self {
        Self { frames }
    }
}

impl Component<DataState> for StaticData {
    fn kind(&self) -> &'static str {
        "data"
    }

    fn render(&self, _model: &SceneNode<DataState>) -> Option<Element> {
        None
    }

    fn on_start(&self, model: &SceneNode<DataState>) {
        let time_range = model.resolve_time_range().map(|node| node.time_range());
        model.set_state(|s| {
            s.data = Some(PanelData {
                state: LoadingState::Loading,
                series: Vec::new(),
                time_range: time_range.clone(),
            })
        });
        let series = self.frames.clone();
        tracing::debug!(node = %model.id(), frames = series.len(), "static data loaded");
        model.set_state(|s| {
            s.data = Some(PanelData {
                state: LoadingState::Done,
                series,
                time_range,
            })
        });
    }

    fn on_stop(&self, model: &SceneNode<DataState>) {
        let loading = model
            .state()
            .data
            .as_ref()
            .is_some_and(|d| d.state == LoadingState::Loading);
        if loading {
            model.set_state(|s| {
                if let Some(data) = s.data.as_mut() {
                    data.state = LoadingState::NotStarted;
                }
            });
        }
    }
}

/// New data provider node serving `frames`.
pub fn static_data(frames: Vec<DataFrame>) -> SceneNode<DataState> {
    SceneNode::new(DataState::default(), StaticData::new(frames))
}
