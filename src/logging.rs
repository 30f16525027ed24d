//! Tracing installation.
//!
//! The engine logs through [`tracing`]: scheduling and solve summaries at
//! `debug`, constraint diffs at `trace`, layout failures and dock warnings at
//! `warn`. Hosts that do not install their own subscriber can call
//! [`install_tracing`].

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INSTALLED: Once = Once::new();

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (idempotent).
///
/// Does nothing if another global subscriber is already installed.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            eprintln!("Undertow tracing subscriber failed to initialize");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        install_tracing();
        install_tracing();
        tracing::debug!("still alive");
    }
}
