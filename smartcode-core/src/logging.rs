//! Logging configuration using tracing
//!
//! The TUI owns the terminal, so logs only ever go to a daily rolling file.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "SMARTCODE_LOG";

/// Initialize the logging subsystem
///
/// Logs are written to `<data_dir>/logs/smartcode.log.<date>`.
/// Log level is controlled by the `SMARTCODE_LOG` environment variable.
///
/// # Examples
/// ```bash
/// SMARTCODE_LOG=debug smartcode
/// ```
pub fn init(data_dir: &Path) -> Result<()> {
    let log_dir = log_directory(data_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "smartcode.log");

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("smartcode=info,smartcode_core=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| crate::error::Error::Config { message: e.to_string() })?;

    tracing::info!("smartcode starting, log directory: {}", log_dir.display());
    Ok(())
}

/// Directory the rolling log files live in.
pub fn log_directory(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
