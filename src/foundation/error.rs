/// Convenience result type used across dyndash.
pub type DyndashResult<T> = Result<T, DyndashError>;

/// Top-level error taxonomy used by the fallible dyndash APIs.
///
/// The reactive core (publishing, subscribing, resolving scoped providers, view lifecycle) has no
/// failure modes of its own; errors only surface from value construction and scene descriptors.
#[derive(thiserror::Error, Debug)]
pub enum DyndashError {
    /// Invalid user-provided value (time ranges, sizing, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more observers faulted while a value was delivered.
    #[error("observer error: {0}")]
    Observer(String),

    /// A scene descriptor could not be turned into a live tree.
    #[error("descriptor error: {0}")]
    Descriptor(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DyndashError {
    /// Build a [`DyndashError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DyndashError::Observer`] value.
    pub fn observer(msg: impl Into<String>) -> Self {
        Self::Observer(msg.into())
    }

    /// Build a [`DyndashError::Descriptor`] value.
    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::Descriptor(msg.into())
    }

    /// Build a [`DyndashError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for DyndashError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
