use crate::level::ParseLevelError;

/// Error returned by [`JsonStreamHandler::try_log`](crate::handler::JsonStreamHandler::try_log)
/// and [`JsonStreamHandler::format`](crate::handler::JsonStreamHandler::format).
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("failed to serialize log line: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log line: {0}")]
    Write(#[from] std::io::Error),
}

/// Error type returned when building a logger configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown or unsupported output target: {0:?}")]
    UnknownTarget(String),

    #[error(transparent)]
    InvalidLevel(#[from] ParseLevelError),
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("global subscriber already set: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}
