// 📝 Logging - tracing subscriber setup shared by both binaries

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Events go to stderr so CSV written to stdout stays clean.
/// Safe to call more than once; only the first call has effect.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
