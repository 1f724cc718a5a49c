use crate::{
    render::element::Element,
    scene::{
        node::{Children, Component, SceneNode, SceneRef, SceneState},
        state::LayoutChildState,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

impl FlexDirection {
    fn as_str(self) -> &'static str {
        match self {
            FlexDirection::Row => "row",
            FlexDirection::Column => "column",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FlexLayoutState {
    pub direction: FlexDirection,
    pub layout: LayoutChildState,
    pub children: Vec<SceneRef>,
}

impl SceneState for FlexLayoutState {
    fn children(&self) -> Children {
        self.children.iter().cloned().collect()
    }
}

/// Row or column of heterogeneous child nodes.
pub struct FlexLayout;

impl Component<FlexLayoutState> for FlexLayout {
    fn kind(&self) -> &'static str {
        "flex"
    }

    fn render(&self, model: &SceneNode<FlexLayoutState>) -> Option<Element> {
        let state = model.use_state();
        Some(
            Element::new("flex-layout")
                .key(state.layout.key.clone())
                .prop("direction", state.direction.as_str())
                .children(state.children.iter().filter_map(SceneRef::render)),
        )
    }
}

pub fn flex_layout(
    direction: FlexDirection,
    children: impl IntoIterator<Item = SceneRef>,
) -> SceneNode<FlexLayoutState> {
    SceneNode::new(
        FlexLayoutState {
            direction,
            layout: LayoutChildState::default(),
            children: children.into_iter().collect(),
        },
        FlexLayout,
    )
}
