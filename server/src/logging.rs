use env_logger::Env;

/// Installs the process logger. `RUST_LOG` wins over `default_level`.
///
/// Calling it again is harmless; only the first logger is kept.
pub fn init(default_level: &str) {
    let env = Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
