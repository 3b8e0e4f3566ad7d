use aipaca::core::output;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = std::env::var("AIPACA_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    if let Err(e) = aipaca::run() {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
