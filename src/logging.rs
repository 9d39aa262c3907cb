//! Explicit logging bootstrap.
//!
//! Per the Design Notes (SPEC_FULL.md §9), initialization is never a side effect of
//! linking against this crate: `init` must be called once, explicitly, from a binary's
//! `main()`. Library modules only emit `tracing` events; they never install a
//! subscriber themselves.

use tracing_subscriber::EnvFilter;

/// Options accepted by [`init`]. `log_level` is a `tracing` directive string (e.g.
/// `"info"`, `"html_index=debug"`); `json` switches to structured JSON output, useful
/// when the `html-index-serve` binary runs behind a log collector.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub log_level: String,
    pub json: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Installs the global `tracing` subscriber. Safe to call at most once per process;
/// a second call is a no-op (the underlying `tracing` global dispatcher rejects it).
pub fn init(options: &LoggingOptions) {
    let filter = EnvFilter::try_new(&options.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if options.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
