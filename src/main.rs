//! listinha main entrypoint.

use listinha::ui::messages;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!();
    if let Err(e) = listinha::run().await {
        messages::error(&e);
        std::process::exit(1);
    }
}
