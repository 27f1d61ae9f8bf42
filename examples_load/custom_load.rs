use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_json_stream::init::init_tracing;
use tracing_json_stream::{
    HandlerConfig, JsonStreamHandler, Level, Metadata, MetadataProvider, MetadataValue,
};
use tracing_json_stream::noop_stream::NoopStream;

/// Same load as `default_load`, but with persistent metadata and a
/// provider, so every line goes through the merge path, spread over
/// several tasks.
#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = HandlerConfig {
        metadata_key: "ctx".to_string(),
        timestamp_key: "ts".to_string(),
    };
    let mut handler = JsonStreamHandler::new("custom-load", config, Arc::new(NoopStream));
    handler.set_log_level(Level::Error);
    handler.set_metadata_value("service", Some("load-test".into()));
    handler.set_metadata_provider(Some(MetadataProvider::new(|| {
        let mut provided = Metadata::new();
        provided.insert(
            "thread".to_string(),
            MetadataValue::String(format!("{:?}", std::thread::current().id())),
        );
        provided
    })));

    init_tracing(handler);

    let tasks: u64 = 4;
    let per_task: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..tasks)
        .map(|task| {
            tokio::spawn(async move {
                for i in 0..per_task {
                    error!(task, iteration = i, "custom load test error");
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.await;
    }

    let n = tasks * per_task;
    let elapsed = start.elapsed();
    println!("custom config: formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
