use thiserror::Error;

/// Errors from talking to the `kde` binary
#[derive(Debug, Error)]
pub enum KdeError {
    /// The process could not be started at all
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited non-zero; `message` is its stderr, shown verbatim
    #[error("{message}")]
    Failed { command: String, message: String },

    #[error("invalid status output: {0}")]
    InvalidStatus(#[from] serde_json::Error),

    /// User input rejected before any command was built
    #[error("{0}")]
    InvalidInput(String),
}
