use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_json_stream::init::init_tracing;
use tracing_json_stream::noop_stream::NoopStream;
use tracing_json_stream::{HandlerConfig, JsonStreamHandler};

#[tokio::main]
async fn main() {
    let handler = JsonStreamHandler::new("default-load", HandlerConfig::default(), Arc::new(NoopStream));
    init_tracing(handler);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
