//! Tracing setup shared by the binaries

use std::io;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once. `RUST_LOG` wins over `level`; logs go
/// to stderr because extractor stdout carries the status line.
pub fn init_tracing(level: &str) {
    INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_ansi(false);

        // a subscriber installed by an embedding program takes precedence
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init();
    });
}
