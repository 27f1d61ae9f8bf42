use crate::level::Level;
use crate::metadata::Metadata;

/// One log call, as handed to [`JsonStreamHandler`](crate::handler::JsonStreamHandler).
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    /// Explicit metadata for this call only; overrides persistent and
    /// provided metadata on key collisions.
    pub metadata: Option<Metadata>,
    pub source: String,
    pub file: String,
    pub function: String,
    pub line: u32,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            metadata: None,
            source: String::new(),
            file: String::new(),
            function: String::new(),
            line: 0,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}
