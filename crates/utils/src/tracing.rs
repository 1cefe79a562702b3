use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// Honors `RUST_LOG` and falls back to `info`. Output goes to stderr so that
/// rendered tags and JSON written to stdout stay machine readable.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create a span covering one build request
pub fn build_span(bundle_id: &str) -> Span {
    span!(Level::INFO, "build", bundle = %bundle_id)
}

/// Emit a structured event for cache lookups
pub fn cache_event(strategy: &str, cache_key: &str, hit: bool) {
    if hit {
        debug!(
            strategy = %strategy,
            cache_key = %cache_key,
            "cache_hit"
        );
    } else {
        debug!(
            strategy = %strategy,
            cache_key = %cache_key,
            "cache_miss"
        );
    }
}
