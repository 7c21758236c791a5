use std::process::ExitCode;

use cartwise_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing::Level;

/// Logs go to stderr so command payloads on stdout stay machine-readable.
fn init_logging() {
    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    init_logging();
    cartwise_cli::run()
}
