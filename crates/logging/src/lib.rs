use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for the evplot binaries.
///
/// RUST_LOG takes precedence when set; otherwise the verbose flag picks
/// between debug and info as the default level. Diagnostics go to stderr so
/// piped graph output stays clean.
pub fn init_subscriber(verbose: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let default_level = if verbose { "debug" } else { "info" };
        EnvFilter::new(default_level)
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(env_filter)
        .init();
}
