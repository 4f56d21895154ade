//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `level`. Output goes to stderr so `extract` can print
/// JSON on stdout.
pub fn init_logging(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
}
