use tracing::info;

fn main() {
    tracing_json_stream::init::init("test");

    info!("test message");
}
