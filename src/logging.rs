use crate::error::AppError;
use std::io::stdout;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::constants::paths::LOG_FILE_NAME;

fn crate_filter(debug: bool) -> Result<EnvFilter, AppError> {
    let directive = if debug {
        "nba_warehouse=debug"
    } else {
        "nba_warehouse=info"
    };
    let directive = directive
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Sets up logging for the application.
///
/// - Logs go to stdout and to a daily rolling file next to `log_file`
/// - Creates the log directory if it doesn't exist
/// - `RUST_LOG` is honoured; `debug` raises this crate to debug level
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(log_file: &Path, debug: bool) -> Result<(PathBuf, WorkerGuard), AppError> {
    let log_dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let log_file_name = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(LOG_FILE_NAME)
        .to_string();

    if !log_dir.exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    // Set up a rolling file appender that creates a new log file each day
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);

    // The guard must be kept alive for the duration of the program
    // to ensure logs are flushed properly
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(stdout)
                .with_ansi(true)
                .with_target(false)
                .with_filter(crate_filter(debug)?),
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(crate_filter(debug)?),
        )
        .try_init()
        .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    Ok((log_dir.join(log_file_name), guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_filter_levels() {
        assert!(crate_filter(false).unwrap().to_string().contains("nba_warehouse=info"));
        assert!(crate_filter(true).unwrap().to_string().contains("nba_warehouse=debug"));
    }
}
