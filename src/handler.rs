use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::HandlerError;
use crate::level::Level;
use crate::metadata::{Metadata, MetadataProvider, MetadataValue};
use crate::record::LogRecord;
use crate::stream::{OutputStream, StdioStream};
use crate::timestamp::local_timestamp;

/// Names of the two configurable fields of every emitted line.
///
/// Both names are taken as-is; an empty string yields an empty JSON key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub metadata_key: String,
    pub timestamp_key: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            metadata_key: "metadata".to_string(),
            timestamp_key: "timestamp".to_string(),
        }
    }
}

/// Formats [`LogRecord`]s as single-line JSON objects and writes them to
/// an [`OutputStream`].
///
/// Every line carries, in order: the timestamp, `level`, `message`,
/// `logger_label`, `source`, `file`, `function`, `line`, and finally the
/// metadata object when the effective metadata is non-empty.
///
/// Metadata is layered from three sources, later ones overwriting keys of
/// earlier ones: the handler's persistent metadata, the output of the
/// metadata provider, and the record's explicit metadata.
pub struct JsonStreamHandler {
    label: String,
    config: HandlerConfig,
    stream: Arc<dyn OutputStream>,
    metadata: Metadata,
    /// Serialized form of `metadata`; `None` when it is empty.
    metadata_json: Option<Box<RawValue>>,
    metadata_provider: Option<MetadataProvider>,
    log_level: Level,
}

impl JsonStreamHandler {
    pub fn new(
        label: impl Into<String>,
        config: HandlerConfig,
        stream: Arc<dyn OutputStream>,
    ) -> Self {
        Self {
            label: label.into(),
            config,
            stream,
            metadata: Metadata::new(),
            metadata_json: None,
            metadata_provider: None,
            log_level: Level::default(),
        }
    }

    /// Handler writing to the shared standard-output stream.
    pub fn standard_output(label: impl Into<String>, config: HandlerConfig) -> Self {
        Self::new(label, config, StdioStream::stdout())
    }

    /// Handler writing to the shared standard-error stream.
    pub fn standard_error(label: impl Into<String>, config: HandlerConfig) -> Self {
        Self::new(label, config, StdioStream::stderr())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn stream(&self) -> &Arc<dyn OutputStream> {
        &self.stream
    }

    /// Threshold read by the facade adapter; the handler itself logs
    /// whatever it is given.
    pub fn log_level(&self) -> Level {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: Level) {
        self.log_level = level;
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// Set (`Some`) or remove (`None`) one persistent metadata entry.
    pub fn set_metadata_value(&mut self, key: impl Into<String>, value: Option<MetadataValue>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.metadata.insert(key, value);
            }
            None => {
                self.metadata.remove(&key);
            }
        }
        self.refresh_metadata_json();
    }

    /// Replace the whole persistent metadata map.
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
        self.refresh_metadata_json();
    }

    pub fn metadata_provider(&self) -> Option<&MetadataProvider> {
        self.metadata_provider.as_ref()
    }

    pub fn set_metadata_provider(&mut self, provider: Option<MetadataProvider>) {
        self.metadata_provider = provider;
    }

    fn refresh_metadata_json(&mut self) {
        self.metadata_json = serialize_metadata(&self.metadata);
    }

    /// Merge persistent, provided and explicit metadata.
    ///
    /// Returns `None` when neither the provider nor the record contributes
    /// anything, in which case the cached persistent form applies.
    fn effective_metadata(&self, explicit: Option<&Metadata>) -> Option<Metadata> {
        let provided = self
            .metadata_provider
            .as_ref()
            .map(MetadataProvider::get)
            .unwrap_or_default();
        let explicit = explicit.filter(|m| !m.is_empty());

        if provided.is_empty() && explicit.is_none() {
            return None;
        }

        let mut merged = self.metadata.clone();
        merged.extend(provided);
        if let Some(explicit) = explicit {
            merged.extend(explicit.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(merged)
    }

    /// Render `record` as one JSON line, newline included.
    pub fn format(&self, record: &LogRecord) -> Result<String, HandlerError> {
        let timestamp = local_timestamp();

        let fresh = self
            .effective_metadata(record.metadata.as_ref())
            .map(|merged| serialize_metadata(&merged));
        let metadata_json = match &fresh {
            Some(fresh) => fresh.as_deref(),
            None => self.metadata_json.as_deref(),
        };

        let mut object = JsonLine::with_capacity(9);
        object.insert(&self.config.timestamp_key, Field::Text(&timestamp));
        object.insert("level", Field::Text(record.level.as_str()));
        object.insert("message", Field::Text(&record.message));
        object.insert("logger_label", Field::Text(&self.label));
        object.insert("source", Field::Text(&record.source));
        object.insert("file", Field::Text(&record.file));
        object.insert("function", Field::Text(&record.function));
        object.insert("line", Field::Line(record.line));
        if let Some(metadata) = metadata_json {
            object.insert(&self.config.metadata_key, Field::Object(metadata));
        }

        let mut line = serde_json::to_string(&object)?;
        line.push('\n');
        Ok(line)
    }

    /// Format and write `record`, reporting failures.
    pub fn try_log(&self, record: &LogRecord) -> Result<(), HandlerError> {
        let line = self.format(record)?;
        self.stream.write(&line)?;
        Ok(())
    }

    /// Format and write `record`. Failures drop the line.
    pub fn log(&self, record: &LogRecord) {
        let _ = self.try_log(record);
    }
}

impl fmt::Debug for JsonStreamHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStreamHandler")
            .field("label", &self.label)
            .field("config", &self.config)
            .field("metadata", &self.metadata)
            .field("metadata_provider", &self.metadata_provider)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

/// `None` for an empty map; a map that fails to serialize loses the field.
fn serialize_metadata(metadata: &Metadata) -> Option<Box<RawValue>> {
    if metadata.is_empty() {
        return None;
    }
    serde_json::value::to_raw_value(metadata).ok()
}

enum Field<'a> {
    Text(&'a str),
    Line(u32),
    Object(&'a RawValue),
}

impl Serialize for Field<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Text(text) => serializer.serialize_str(text),
            Field::Line(line) => serializer.serialize_u32(*line),
            Field::Object(raw) => raw.serialize(serializer),
        }
    }
}

/// Ordered JSON object; inserting an existing key replaces its value in
/// place.
struct JsonLine<'a> {
    fields: Vec<(&'a str, Field<'a>)>,
}

impl<'a> JsonLine<'a> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    fn insert(&mut self, key: &'a str, value: Field<'a>) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }
}

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::LockedStream;

    fn handler() -> (JsonStreamHandler, Arc<LockedStream<Vec<u8>>>) {
        let out = Arc::new(LockedStream::buffer());
        let handler = JsonStreamHandler::new("Test", HandlerConfig::default(), out.clone());
        (handler, out)
    }

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
            .collect()
    }

    #[test]
    fn cache_follows_persistent_metadata_updates() {
        let (mut handler, _) = handler();
        assert!(handler.metadata_json.is_none());

        handler.set_metadata_value("b", Some("2".into()));
        handler.set_metadata_value("a", Some("1".into()));
        assert_eq!(
            handler.metadata_json.as_deref().map(RawValue::get),
            Some(r#"{"a":"1","b":"2"}"#)
        );

        handler.set_metadata_value("a", None);
        handler.set_metadata_value("b", None);
        assert!(handler.metadata_json.is_none());

        handler.set_metadata(meta(&[("c", "3")]));
        assert_eq!(
            handler.metadata_json.as_deref().map(RawValue::get),
            Some(r#"{"c":"3"}"#)
        );
    }

    #[test]
    fn precedence_is_persistent_then_provider_then_explicit() {
        let (mut handler, _) = handler();
        handler.set_metadata(meta(&[("a", "1")]));
        handler.set_metadata_provider(Some(MetadataProvider::new(|| {
            meta(&[("a", "2"), ("b", "2")])
        })));

        let effective = handler
            .effective_metadata(Some(&meta(&[("b", "3"), ("c", "3")])))
            .unwrap();
        assert_eq!(effective, meta(&[("a", "2"), ("b", "3"), ("c", "3")]));
    }

    #[test]
    fn empty_per_call_layers_reuse_the_cache() {
        let (mut handler, _) = handler();
        handler.set_metadata(meta(&[("a", "1")]));
        handler.set_metadata_provider(Some(MetadataProvider::new(Metadata::new)));

        assert!(handler.effective_metadata(None).is_none());
        assert!(handler.effective_metadata(Some(&Metadata::new())).is_none());
    }

    #[test]
    fn duplicate_keys_replace_in_place() {
        let out = Arc::new(LockedStream::buffer());
        let config = HandlerConfig {
            metadata_key: "level".to_string(),
            timestamp_key: "ts".to_string(),
        };
        let mut handler = JsonStreamHandler::new("Test", config, out.clone());
        handler.set_metadata_value("k", Some("v".into()));

        let line = handler
            .format(&LogRecord::new(Level::Info, "m").with_line(7))
            .unwrap();
        let after_ts = line.split_once(',').unwrap().1;
        assert!(after_ts.starts_with(r#""level":{"k":"v"},"message":"m""#));
        assert_eq!(line.matches(r#""level":"#).count(), 1);
    }

    #[test]
    fn log_writes_exactly_one_line() {
        let (handler, out) = handler();
        handler.log(&LogRecord::new(Level::Error, "boom"));
        handler.log(&LogRecord::new(Level::Error, "again"));
        handler.stream().flush().unwrap();

        let contents = out.contents();
        assert_eq!(contents.matches('\n').count(), 2);
        assert!(contents.ends_with('\n'));
    }
}
