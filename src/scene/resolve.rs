//! Scoped resolvers: walk from a node toward the root and stop at the first provider.
//!
//! Both walks are read-only and bounded by tree depth; reaching the root without a provider is
//! the defined empty result.

use std::rc::Rc;

use crate::scene::{
    node::{ErasedNode, SceneNode},
    state::{DataState, TimeRangeState},
};

fn find_nearest<T>(
    start: Rc<dyn ErasedNode>,
    local: impl Fn(&dyn ErasedNode) -> Option<T>,
) -> Option<T> {
    let mut current = Some(start);
    while let Some(node) = current {
        if let Some(found) = local(&*node) {
            return Some(found);
        }
        current = node.parent();
    }
    None
}

pub(crate) fn resolve_data(start: Rc<dyn ErasedNode>) -> Rc<DataState> {
    find_nearest(start, |node| node.local_data())
        .map(|provider| provider.use_state())
        .unwrap_or_default()
}

pub(crate) fn resolve_time_range(start: Rc<dyn ErasedNode>) -> Option<SceneNode<TimeRangeState>> {
    find_nearest(start, |node| node.local_time_range())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolve.rs"]
mod tests;
