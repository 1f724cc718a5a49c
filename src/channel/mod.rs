//! Headless publish/subscribe layer under every scene node.

pub(crate) mod replay;
pub(crate) mod subscription;
