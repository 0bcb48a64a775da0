use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindwardError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Thread error: {0}")]
    Thread(String),

    /// The provider reported a terminal run state; no further tokens follow.
    #[error("Run failed: {0}")]
    RunFailed(String),

    /// The token consumer went away mid-stream.
    #[error("Client disconnected")]
    ClientGone,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WindwardError>;
