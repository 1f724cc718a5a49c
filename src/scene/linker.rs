//! Ownership linker: points every directly owned node back at its owner.

use std::rc::Weak;

use crate::{
    foundation::core::NodeId,
    scene::node::{Children, ErasedNode, SceneState},
};

/// Every node `state` owns directly: providers first, then the declared children.
///
/// A node listed twice is returned twice; linking it twice has the same effect as once.
pub(crate) fn owned_nodes<S: SceneState>(state: &S) -> Children {
    let mut nodes = Children::new();
    if let Some(data) = state.data() {
        nodes.push(data.erase());
    }
    if let Some(time_range) = state.time_range() {
        nodes.push(time_range.erase());
    }
    nodes.extend(state.children());
    nodes
}

/// Attach the direct children of `state` to `owner`. Grandchildren are left alone.
pub(crate) fn link_children<S: SceneState>(
    owner: &Weak<dyn ErasedNode>,
    owner_id: NodeId,
    state: &S,
) -> usize {
    let nodes = owned_nodes(state);
    for node in &nodes {
        node.attach(owner.clone(), owner_id);
    }
    tracing::trace!(owner = %owner_id, linked = nodes.len(), "children linked");
    nodes.len()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/linker.rs"]
mod tests;
