use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The sense network or the candidate lookup could not be obtained.
    #[error("Sense resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Disambiguation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl GraphError {
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// True when the whole session had to be abandoned because the
    /// underlying resource failed.
    pub fn is_resource_failure(&self) -> bool {
        matches!(
            self,
            Self::ResourceUnavailable(_) | Self::Io(_) | Self::Json(_) | Self::Parse { .. }
        )
    }
}
