use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "ARRANGE_LOG";

/// Installs the global subscriber, writing to stderr so stdout stays free for
/// the plan preview and summary.
pub fn init(default_level: &str, quiet: bool) {
    let filter = match quiet {
        true => EnvFilter::new("warn"),
        false => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
