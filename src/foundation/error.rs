/// Convenience result type used across stagecraft.
pub type StageResult<T> = Result<T, StageError>;

/// Top-level error taxonomy used by scene, animation and driver APIs.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Invalid user-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Tree ownership violations (double attach, cycles, stale handles).
    #[error("ownership error: {0}")]
    Ownership(String),

    /// Backing resource acquisition failures reported by the drawing surface.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors while scheduling or cancelling animations.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Ownership`] value.
    pub fn ownership(msg: impl Into<String>) -> Self {
        Self::Ownership(msg.into())
    }

    /// Build a [`StageError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`StageError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`StageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
