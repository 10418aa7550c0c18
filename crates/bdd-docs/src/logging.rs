//! Structured logging with environment variable configuration.
//!
//! Logs are written to stderr so the JSON document emitted on stdout stays
//! machine-readable.

use tracing_subscriber::EnvFilter;

use crate::config::DocsConfig;

fn filter_from_config(config: &DocsConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the logging subsystem based on configuration.
///
/// Log level precedence (highest to lowest):
///
/// 1. CLI `--log-level` (parsed into `config.log_level`)
/// 2. `BDD_DOCS_LOG_LEVEL` (parsed into `config.log_level`)
/// 3. Default configuration value
///
/// If a global subscriber is already set, this function silently ignores
/// the error; the first subscriber wins.
pub fn init_logging(config: &DocsConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
