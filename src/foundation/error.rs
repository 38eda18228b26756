/// Convenience result type used across mapleframe.
pub type MapleResult<T> = Result<T, MapleError>;

/// Top-level error taxonomy used by compositor, lookup and history APIs.
#[derive(thiserror::Error, Debug)]
pub enum MapleError {
    /// A character name or identifier could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient failure of an external service (transport error or HTTP status).
    #[error("service error: {0}")]
    Service(String),

    /// An image could not be fetched or decoded.
    ///
    /// Render operations never return this; they substitute a placeholder instead.
    #[error("image unavailable: {0}")]
    ImageUnavailable(String),

    /// Invalid user-provided data rejected at a boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MapleError {
    /// Build a [`MapleError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`MapleError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`MapleError::ImageUnavailable`] value.
    pub fn image_unavailable(msg: impl Into<String>) -> Self {
        Self::ImageUnavailable(msg.into())
    }

    /// Build a [`MapleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MapleError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that end a history walk when raised while resolving the name.
    pub fn is_fatal_for_walk(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for MapleError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
