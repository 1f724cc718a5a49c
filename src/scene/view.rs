use std::cell::{Cell, RefCell};

use crate::{
    foundation::core::NodeId,
    scene::{
        node::{SceneNode, SceneRef},
        state::DataState,
    },
};

/// Per-node view bookkeeping: whether the node is on screen, which provider its entry started,
/// and (when the node itself is a provider) how many viewers currently hold it started.
#[derive(Default)]
pub(crate) struct ViewState {
    in_view: Cell<bool>,
    started: RefCell<Option<SceneNode<DataState>>>,
    starts: Cell<u32>,
}

impl ViewState {
    pub(crate) fn is_in_view(&self) -> bool {
        self.in_view.get()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.starts.get() > 0
    }

    pub(crate) fn enter(&self, node: &SceneRef) {
        if node.is_destroyed() {
            tracing::debug!(node = %node.id(), "enter_view on destroyed node ignored");
            return;
        }
        if self.in_view.replace(true) {
            tracing::trace!(node = %node.id(), "enter_view while already in view");
            return;
        }
        // The provider is captured so the matching exit stops the same one, even if the state
        // swapped providers in between.
        let provider = node.local_data();
        if let Some(provider) = &provider {
            provider.start();
        }
        *self.started.borrow_mut() = provider;
    }

    pub(crate) fn exit(&self, id: NodeId) {
        if !self.in_view.replace(false) {
            tracing::trace!(node = %id, "exit_view without matching enter_view");
            return;
        }
        let provider = self.started.borrow_mut().take();
        if let Some(provider) = provider {
            provider.stop();
        }
    }

    /// Returns true on the 0 -> 1 transition.
    pub(crate) fn acquire(&self) -> bool {
        let n = self.starts.get();
        self.starts.set(n.saturating_add(1));
        n == 0
    }

    /// Returns true on the 1 -> 0 transition; a release with no holder is ignored.
    pub(crate) fn release(&self) -> bool {
        match self.starts.get() {
            0 => false,
            n => {
                self.starts.set(n - 1);
                n == 1
            }
        }
    }
}

/// Mount guard: the node is in view for as long as the guard lives.
///
/// Each guard produces exactly one `enter_view`/`exit_view` pair.
#[must_use = "dropping a Mounted guard immediately takes the node out of view"]
pub struct Mounted {
    node: SceneRef,
}

impl Mounted {
    pub(crate) fn new(node: SceneRef) -> Self {
        node.enter_view();
        Self { node }
    }

    pub fn node(&self) -> &SceneRef {
        &self.node
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.node.exit_view();
    }
}

impl std::fmt::Debug for Mounted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mounted").field("node", &self.node.id()).finish()
    }
}

/// Mount `root` and every node it declares, parents first.
pub fn mount_tree(root: &SceneRef) -> Vec<Mounted> {
    let mut guards = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        let children = node.children();
        stack.extend(children.into_iter().rev());
        guards.push(node.mount());
    }
    guards
}

#[cfg(test)]
#[path = "../../tests/unit/scene/view.rs"]
mod tests;
