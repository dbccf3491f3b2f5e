#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid role identifier: {0:?} (expected arn:aws:iam::<account-id>:role/<role-name>)")]
    InvalidRoleIdentifier(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Provider error ({kind}): {message}")]
    ProviderError {
        kind: crate::client::ProviderErrorKind,
        message: String,
    },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Insufficient session duration: requested {requested} seconds but the granted session lasts {granted} seconds; --duration cannot be longer than the maximum session duration allowed by the role")]
    InsufficientSessionDuration { requested: i64, granted: i64 },

    #[error("Failed to write credential cache {}", .path.display())]
    CacheWriteError {
        path: std::path::PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("No cached credentials at {}", .0.display())]
    CacheNotFound(std::path::PathBuf),

    #[error("Failed to launch {program:?}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Process exit status to terminate with when this error aborts an invocation.
    pub fn exit_code(&self) -> i32 {
        match *self {
            Self::InvalidRoleIdentifier(_) | Self::ValidationError(_) => 2,
            Self::LaunchError { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                127
            }
            Self::LaunchError { .. } => 126,
            _ => 1,
        }
    }
}
