/// Convenience result type used across mashup.
pub type MashupResult<T> = Result<T, MashupError>;

/// Top-level error taxonomy used by catalog, generator and executor APIs.
#[derive(thiserror::Error, Debug)]
pub enum MashupError {
    /// Malformed or incomplete generator/format parameters.
    #[error("config error: {0}")]
    Config(String),

    /// A catalog key, plan file or template that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A document that must be created fresh is already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Malformed source, region, stamp or format data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external tool (ffmpeg, ffprobe, blender) exited abnormally.
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// The run was cancelled through a [`crate::CancelToken`].
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MashupError {
    /// Build a [`MashupError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MashupError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`MashupError::AlreadyExists`] value.
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Build a [`MashupError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MashupError::ExternalTool`] value.
    pub fn external_tool(msg: impl Into<String>) -> Self {
        Self::ExternalTool(msg.into())
    }

    /// Build a [`MashupError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Build a [`MashupError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for [`MashupError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// `true` for [`MashupError::AlreadyExists`].
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
