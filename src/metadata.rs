use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Annotations attached to a log line. Keys iterate, and serialize, in
/// ascending byte order.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Text emitted for a `StringConvertible` whose `Display` impl fails.
pub const UNREPRESENTABLE: &str = "<unrepresentable>";

/// A single metadata value.
///
/// Scalars always serialize as JSON strings; arrays and dictionaries keep
/// their structure, recursively.
#[derive(Clone)]
pub enum MetadataValue {
    String(String),
    StringConvertible(Arc<dyn fmt::Display + Send + Sync>),
    Array(Vec<MetadataValue>),
    Dictionary(Metadata),
}

impl MetadataValue {
    /// Wrap any displayable value; it is rendered at serialization time.
    pub fn convertible<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        MetadataValue::StringConvertible(Arc::new(value))
    }
}

fn render(value: &(dyn fmt::Display + Send + Sync)) -> String {
    let mut out = String::new();
    match write!(out, "{}", value) {
        Ok(()) => out,
        Err(_) => UNREPRESENTABLE.to_string(),
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::String(value) => serializer.serialize_str(value),
            MetadataValue::StringConvertible(value) => {
                serializer.serialize_str(&render(value.as_ref()))
            }
            MetadataValue::Array(values) => serializer.collect_seq(values),
            MetadataValue::Dictionary(entries) => serializer.collect_map(entries),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(value) => f.write_str(value),
            MetadataValue::StringConvertible(value) => f.write_str(&render(value.as_ref())),
            MetadataValue::Array(values) => {
                f.write_str("[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            MetadataValue::Dictionary(entries) => {
                f.write_str("[")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Debug for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(value) => f.debug_tuple("String").field(value).finish(),
            MetadataValue::StringConvertible(value) => f
                .debug_tuple("StringConvertible")
                .field(&render(value.as_ref()))
                .finish(),
            MetadataValue::Array(values) => f.debug_tuple("Array").field(values).finish(),
            MetadataValue::Dictionary(entries) => {
                f.debug_tuple("Dictionary").field(entries).finish()
            }
        }
    }
}

/// Convertible values compare by their rendered text.
impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetadataValue::String(a), MetadataValue::String(b)) => a == b,
            (MetadataValue::StringConvertible(a), MetadataValue::StringConvertible(b)) => {
                render(a.as_ref()) == render(b.as_ref())
            }
            (MetadataValue::Array(a), MetadataValue::Array(b)) => a == b,
            (MetadataValue::Dictionary(a), MetadataValue::Dictionary(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(values: Vec<MetadataValue>) -> Self {
        MetadataValue::Array(values)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(entries: Metadata) -> Self {
        MetadataValue::Dictionary(entries)
    }
}

/// Callback producing dynamic metadata, invoked once per log call.
#[derive(Clone)]
pub struct MetadataProvider {
    provide: Arc<dyn Fn() -> Metadata + Send + Sync>,
}

impl MetadataProvider {
    pub fn new<F>(provide: F) -> Self
    where
        F: Fn() -> Metadata + Send + Sync + 'static,
    {
        Self { provide: Arc::new(provide) }
    }

    /// Combine several providers into one. Providers are invoked in order
    /// and later ones overwrite keys of earlier ones.
    pub fn multiplex(providers: Vec<MetadataProvider>) -> Self {
        Self::new(move || {
            let mut merged = Metadata::new();
            for provider in &providers {
                merged.extend(provider.get());
            }
            merged
        })
    }

    pub fn get(&self) -> Metadata {
        (self.provide)()
    }
}

impl fmt::Debug for MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataProvider").finish_non_exhaustive()
    }
}
