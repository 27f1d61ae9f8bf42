#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use tracing_json_stream::{HandlerConfig, JsonStreamHandler, LockedStream, Metadata, MetadataValue};

pub const TIMESTAMP_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}[+-]\d{4}$";

pub fn collecting_handler(config: HandlerConfig) -> (JsonStreamHandler, Arc<LockedStream<Vec<u8>>>) {
    let out = Arc::new(LockedStream::buffer());
    let handler = JsonStreamHandler::new("Test", config, out.clone());
    (handler, out)
}

pub fn meta(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
        .collect()
}

pub fn last_line_json(contents: &str) -> serde_json::Value {
    let line = contents.lines().last().expect("no line written");
    serde_json::from_str(line).expect("line is not valid JSON")
}

/// Top-level keys of a JSON object in the order they appear in the text.
pub fn key_order(line: &str) -> Vec<String> {
    struct Keys;

    impl<'de> Visitor<'de> for Keys {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut keys = Vec::new();
            while let Some(key) = map.next_key::<String>()? {
                map.next_value::<IgnoredAny>()?;
                keys.push(key);
            }
            Ok(keys)
        }
    }

    let mut de = serde_json::Deserializer::from_str(line);
    (&mut de).deserialize_map(Keys).expect("line is not a JSON object")
}
