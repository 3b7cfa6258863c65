// This module sets up the logger level.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber on stderr so stdout only carries results.
/// `RUST_LOG` wins over `logger_level` when set.
pub fn setup(logger_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(logger_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter(logger_level: &str) -> EnvFilter {
    EnvFilter::new(format!("csv_mongo_loader={logger_level},mongodb=warn"))
}
