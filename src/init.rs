use crate::env::{
    JSON_LOG_LABEL_ENV, JSON_LOG_LEVEL_ENV, JSON_LOG_METADATA_KEY_ENV, JSON_LOG_TARGET_ENV,
    JSON_LOG_TIMESTAMP_KEY_ENV,
};
use crate::error::{ConfigError, InitError};
use crate::handler::{HandlerConfig, JsonStreamHandler};
use crate::layer::JsonLayer;
use crate::level::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Process stream a logger writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

/// Parse a target name: `stdout` or `stderr` (case-insensitive).
pub fn parse_target(name: &str) -> Result<Target, ConfigError> {
    let lower = name.trim().to_ascii_lowercase();

    if lower == "stdout" {
        Ok(Target::Stdout)
    } else if lower == "stderr" {
        Ok(Target::Stderr)
    } else {
        Err(ConfigError::UnknownTarget(name.to_string()))
    }
}

/// Logger configuration.
///
/// **Fields**
/// - `label`: emitted as `logger_label` on every line.
/// - `handler`: names of the timestamp and metadata fields.
/// - `target`: standard output or standard error.
/// - `level`: events below this level are not written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub label: String,
    pub handler: HandlerConfig,
    pub target: Target,
    pub level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            label: "app".to_string(),
            handler: HandlerConfig::default(),
            target: Target::Stdout,
            level: Level::Info,
        }
    }
}

impl LoggerConfig {
    /// Build a configuration from the `JSON_LOG_*` environment variables,
    /// using [`LoggerConfig::default`] for any that are unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoggerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(label) = lookup(JSON_LOG_LABEL_ENV) {
            config.label = label;
        }
        if let Some(level) = lookup(JSON_LOG_LEVEL_ENV) {
            config.level = level.parse()?;
        }
        if let Some(target) = lookup(JSON_LOG_TARGET_ENV) {
            config.target = parse_target(&target)?;
        }
        if let Some(key) = lookup(JSON_LOG_METADATA_KEY_ENV) {
            config.handler.metadata_key = key;
        }
        if let Some(key) = lookup(JSON_LOG_TIMESTAMP_KEY_ENV) {
            config.handler.timestamp_key = key;
        }

        Ok(config)
    }

    /// Build the handler described by this configuration.
    pub fn build_handler(&self) -> JsonStreamHandler {
        let mut handler = match self.target {
            Target::Stdout => {
                JsonStreamHandler::standard_output(self.label.clone(), self.handler.clone())
            }
            Target::Stderr => {
                JsonStreamHandler::standard_error(self.label.clone(), self.handler.clone())
            }
        };
        handler.set_log_level(self.level);
        handler
    }
}

/// Install a global `tracing` subscriber that writes through `handler`.
///
/// **Parameters**
/// - `handler`: fully configured [`JsonStreamHandler`]; its metadata,
///   provider and level threshold are fixed from here on.
///
/// **Returns**
/// - `Err(InitError::SetGlobalDefault)` if a global subscriber was
///   already installed.
pub fn try_init_tracing(handler: JsonStreamHandler) -> Result<(), InitError> {
    let subscriber = Registry::default().with(JsonLayer::new(handler));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize global `tracing` subscriber using the provided handler.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing(handler: JsonStreamHandler) {
    try_init_tracing(handler).expect("set global subscriber");
}

/// Initialize tracing from a [`LoggerConfig`].
pub fn try_init_tracing_with_config(config: LoggerConfig) -> Result<(), InitError> {
    try_init_tracing(config.build_handler())
}

/// Initialize tracing from a [`LoggerConfig`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing_with_config(config: LoggerConfig) {
    try_init_tracing_with_config(config).expect("set global subscriber");
}

/// Initialize tracing with defaults: the given label, standard output,
/// `info` threshold. Equivalent to [`init_tracing`] with
/// [`JsonStreamHandler::standard_output`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init(label: impl Into<String>) {
    let config = LoggerConfig {
        label: label.into(),
        ..LoggerConfig::default()
    };
    init_tracing_with_config(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_targets() {
        assert_eq!(parse_target("stdout").unwrap(), Target::Stdout);
        assert_eq!(parse_target(" STDERR ").unwrap(), Target::Stderr);
        assert!(matches!(
            parse_target("syslog"),
            Err(ConfigError::UnknownTarget(name)) if name == "syslog"
        ));
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = LoggerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let vars: HashMap<&str, &str> = [
            (JSON_LOG_LABEL_ENV, "billing"),
            (JSON_LOG_LEVEL_ENV, "warn"),
            (JSON_LOG_TARGET_ENV, "stderr"),
            (JSON_LOG_METADATA_KEY_ENV, "meta"),
            (JSON_LOG_TIMESTAMP_KEY_ENV, ""),
        ]
        .into_iter()
        .collect();

        let config = LoggerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.label, "billing");
        assert_eq!(config.level, Level::Warning);
        assert_eq!(config.target, Target::Stderr);
        assert_eq!(config.handler.metadata_key, "meta");
        assert_eq!(config.handler.timestamp_key, "");

        let handler = config.build_handler();
        assert_eq!(handler.label(), "billing");
        assert_eq!(handler.log_level(), Level::Warning);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let result = LoggerConfig::from_lookup(|key| {
            (key == JSON_LOG_LEVEL_ENV).then(|| "loud".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidLevel(_))));
    }
}
