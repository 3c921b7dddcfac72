use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `warn` unless RUST_LOG says otherwise; `-v` forces debug on top of either.
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(rust_log.unwrap_or_default());

    if verbose {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

pub fn init(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .init();
}
