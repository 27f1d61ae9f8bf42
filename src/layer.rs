use crate::handler::JsonStreamHandler;
use crate::level::Level;
use crate::metadata::{Metadata, MetadataValue};
use crate::record::LogRecord;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every event into a
/// [`LogRecord`] and hands it to a [`JsonStreamHandler`] on the calling
/// thread.
///
/// Events below the handler's [`log_level`](JsonStreamHandler::log_level)
/// are skipped. The event's `message` field becomes the message and every
/// other field becomes explicit metadata for that line.
pub struct JsonLayer {
    handler: JsonStreamHandler,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Lines fully written to the stream.
    pub written_events: Arc<AtomicU64>,
    /// Lines lost to a serialization or write failure.
    pub dropped_events: Arc<AtomicU64>,
}

impl JsonLayer {
    pub fn new(handler: JsonStreamHandler) -> Self {
        Self {
            handler,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handler(&self) -> &JsonStreamHandler {
        &self.handler
    }
}

impl<S> Layer<S> for JsonLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if level < self.handler.log_level() {
            return;
        }

        let mut fields = Metadata::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let function = ctx
            .event_span(event)
            .map(|span| span.name().to_string())
            .unwrap_or_default();

        let mut record = LogRecord::new(level, message.unwrap_or_default())
            .with_source(meta.target())
            .with_file(meta.file().unwrap_or_default())
            .with_function(function)
            .with_line(meta.line().unwrap_or_default());
        if !fields.is_empty() {
            record = record.with_metadata(fields);
        }

        match self.handler.try_log(&record) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Metadata,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: MetadataValue) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, MetadataValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, MetadataValue::convertible(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, MetadataValue::convertible(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, MetadataValue::convertible(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, MetadataValue::convertible(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, MetadataValue::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, MetadataValue::String(format!("{:?}", value)));
        }
    }
}
