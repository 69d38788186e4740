use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise `info`, or `warn` with `--quiet`.
pub fn default_filter(quiet: bool) -> &'static str {
    if quiet { "warn" } else { "info" }
}

pub fn init_logging(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
