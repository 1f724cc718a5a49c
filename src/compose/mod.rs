//! JSON scene descriptors and the builder that turns them into live trees.

pub(crate) mod descriptor;
