/// Crate-wide result alias.
pub type TrailResult<T> = Result<T, TrailError>;

/// Errors raised by the collaborators around the engine (settings, assets, sinks).
///
/// The motion and compositing engine itself absorbs its degenerate inputs locally and never
/// returns one of these.
#[derive(thiserror::Error, Debug)]
pub enum TrailError {
    /// Caller-supplied value is out of range or inconsistent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Settings payload is structurally unusable.
    #[error("settings error: {0}")]
    Settings(String),

    /// Sprite source could not be decoded or rasterized.
    #[error("asset error: {0}")]
    Asset(String),

    /// Capture sink failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrailError {
    /// Build a [`TrailError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrailError::Settings`].
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Build a [`TrailError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`TrailError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TrailError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TrailError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
