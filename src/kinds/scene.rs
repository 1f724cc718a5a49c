use smallvec::smallvec;

use crate::{
    render::element::Element,
    scene::{
        node::{Children, Component, SceneNode, SceneRef, SceneState},
        state::{DataState, TimeRangeState},
    },
};

/// Root of a dashboard: a title, one body node, and the providers shared by everything below.
#[derive(Clone, Debug)]
pub struct SceneRootState {
    pub title: String,
    pub body: SceneRef,
    pub time_range: Option<SceneNode<TimeRangeState>>,
    pub data: Option<SceneNode<DataState>>,
}

impl SceneState for SceneRootState {
    fn children(&self) -> Children {
        smallvec![self.body.clone()]
    }

    fn data(&self) -> Option<&SceneNode<DataState>> {
        self.data.as_ref()
    }

    fn time_range(&self) -> Option<&SceneNode<TimeRangeState>> {
        self.time_range.as_ref()
    }
}

pub struct Scene;

impl Component<SceneRootState> for Scene {
    fn kind(&self) -> &'static str {
        "scene"
    }

    fn render(&self, model: &SceneNode<SceneRootState>) -> Option<Element> {
        let state = model.use_state();
        let mut el = Element::new("scene").prop("title", state.title.clone());
        if let Some(picker) = state.time_range.as_ref().and_then(SceneNode::render) {
            el = el.child(picker);
        }
        if let Some(body) = state.body.render() {
            el = el.child(body);
        }
        Some(el)
    }
}

pub fn scene(state: SceneRootState) -> SceneNode<SceneRootState> {
    SceneNode::new(state, Scene)
}
