use crate::{
    foundation::{
        core::{TimeRange, Timestamp},
        error::DyndashResult,
    },
    render::element::Element,
    scene::{
        node::{Component, SceneNode},
        state::TimeRangeState,
    },
};

/// Time-range provider shown as a picker.
pub struct SceneTimeRange;

impl Component<TimeRangeState> for SceneTimeRange {
    fn kind(&self) -> &'static str {
        "time_range"
    }

    fn render(&self, model: &SceneNode<TimeRangeState>) -> Option<Element> {
        let state = model.use_state();
        Some(
            Element::new("time-range-picker")
                .prop("from", state.range.raw.from.clone())
                .prop("to", state.range.raw.to.clone())
                .prop("fromMs", state.range.from.0)
                .prop("toMs", state.range.to.0),
        )
    }
}

/// New time-range provider node.
pub fn time_range_node(range: TimeRange) -> SceneNode<TimeRangeState> {
    SceneNode::new(TimeRangeState { range }, SceneTimeRange)
}

impl SceneNode<TimeRangeState> {
    pub fn time_range(&self) -> TimeRange {
        self.state().range.clone()
    }

    pub fn set_time_range(&self, range: TimeRange) {
        self.set_state(|s| s.range = range);
    }

    /// Re-evaluate relative bounds (`now-6h`) against `now` and publish the result.
    pub fn refresh(&self, now: Timestamp) -> DyndashResult<()> {
        let range = self.state().range.reevaluate(now)?;
        self.set_time_range(range);
        Ok(())
    }
}
