//! Logging setup.
//!
//! All logs go to **stderr**; stdout belongs to the host. Filtering follows
//! `RUST_LOG` and defaults to `info`.
//!
//! ```bash
//! # Log every API request the provider sends
//! RUST_LOG=firehydrant_provider=debug ./terraform-provider-firehydrant
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn default_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(default_filter("info"))
        .with(stderr_layer())
        .init();
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` when another subscriber got there first.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(default_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}
