use std::io;
use std::sync::Arc;

use tracing::{error, info};
use tracing_json_stream::{
    init::init_tracing,
    stream::OutputStream,
    HandlerConfig, JsonStreamHandler, Level,
};

/// Example of integrating a completely custom destination by
/// implementing the `OutputStream` trait directly. Imagine this forwards
/// lines to some proprietary collector this crate does not provide a
/// stream for. For the sake of example we just print each line with a
/// prefix.
struct PrefixedStdout;

impl OutputStream for PrefixedStdout {
    fn write(&self, text: &str) -> io::Result<()> {
        use std::io::Write;

        let mut out = io::stdout().lock();
        out.write_all(b"[my-collector] ")?;
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

fn main() {
    let mut handler = JsonStreamHandler::new(
        "custom-stream",
        HandlerConfig::default(),
        Arc::new(PrefixedStdout),
    );
    handler.set_log_level(Level::Trace);

    init_tracing(handler);

    info!("custom stream example started");
    error!(collector = "my-collector", "simulated error sent via custom stream");
}
