#[tokio::main]
async fn main() {
    // Log level via RUST_LOG; cycle diagnostics go here, command output
    // goes to stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = graze::cli::run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
