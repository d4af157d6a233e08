//! Logging helpers
//!
//! Thin wrapper around `env_logger` so binaries and tests set up logging the
//! same way.

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence; `level` is used when it is not set.
///
/// # Arguments
///
/// * `level` - Default log level (error, warn, info, debug, trace)
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests, embedding applications) is not an error
    let _ = env_logger::Builder::from_env(env).try_init();
}
