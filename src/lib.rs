pub mod level;
pub mod metadata;
pub mod record;
pub mod stream;
pub mod timestamp;
pub mod error;
pub mod handler;
pub mod layer;

pub mod env;
pub mod init;
pub mod noop_stream;

pub use error::{ConfigError, HandlerError, InitError};
pub use handler::{HandlerConfig, JsonStreamHandler};
pub use layer::JsonLayer;
pub use level::Level;
pub use metadata::{Metadata, MetadataProvider, MetadataValue};
pub use record::LogRecord;
pub use stream::{FlushMode, LockedStream, OutputStream, StdioStream};
