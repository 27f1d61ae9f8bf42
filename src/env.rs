//! Environment variable names used by this crate for convenient
//! configuration of the JSON logger from services.
//!
//! These are purely names; the handler and stream types remain
//! decoupled from environment access.

/// Logger label emitted as `logger_label`.
pub const JSON_LOG_LABEL_ENV: &str = "JSON_LOG_LABEL";

/// Minimum level written, e.g. `info` or `warning`.
pub const JSON_LOG_LEVEL_ENV: &str = "JSON_LOG_LEVEL";

/// Output target, `stdout` or `stderr`.
pub const JSON_LOG_TARGET_ENV: &str = "JSON_LOG_TARGET";

/// Field name of the nested metadata object.
pub const JSON_LOG_METADATA_KEY_ENV: &str = "JSON_LOG_METADATA_KEY";

/// Field name of the timestamp.
pub const JSON_LOG_TIMESTAMP_KEY_ENV: &str = "JSON_LOG_TIMESTAMP_KEY";
