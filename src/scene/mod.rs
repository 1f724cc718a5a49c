//! Scene nodes: typed reactive state, ownership links, scoped providers and view lifecycle.

pub(crate) mod linker;
pub(crate) mod node;
pub(crate) mod resolve;
pub(crate) mod state;
pub(crate) mod view;
pub(crate) mod watch;
