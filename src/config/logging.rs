use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber: `RUST_LOG`-driven filtering at
/// info by default, RFC-3339 UTC timestamps and caller location on every
/// line, span close events included.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .try_init()
    {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
    }
}
