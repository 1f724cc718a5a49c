//! Built-in node kinds: scene root, flex layout, visualization panel and the two providers.

pub(crate) mod data;
pub(crate) mod layout;
pub(crate) mod panel;
pub(crate) mod scene;
pub(crate) mod time_range;

#[cfg(test)]
#[path = "../../tests/unit/kinds/kinds.rs"]
mod tests;
