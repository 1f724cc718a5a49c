//! Renderable output consumed by a UI layer.

pub(crate) mod element;
