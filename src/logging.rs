use std::io;
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static LOGGING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "invoicer=info";

/// Log to stderr, filtered by `RUST_LOG`. Safe to call more than once.
pub fn init() {
    LOGGING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
