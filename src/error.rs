pub type SpotlightResult<T> = Result<T, SpotlightError>;

#[derive(thiserror::Error, Debug)]
pub enum SpotlightError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpotlightError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
