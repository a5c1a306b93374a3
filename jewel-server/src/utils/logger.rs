//! Logging Infrastructure
//!
//! Structured logging setup for development (console) and production
//! (daily rolling files, optionally JSON).

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the console logger at `info`
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless;
/// the second call keeps the first subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, "jewel-server");
                let result = if json {
                    builder.json().with_writer(file_appender).try_init()
                } else {
                    builder.with_ansi(false).with_writer(file_appender).try_init()
                };
                if result.is_err() {
                    tracing::debug!("Logger already initialized");
                }
                return;
            }
            Err(e) => eprintln!("Cannot create log dir {}: {}, logging to stdout", dir.display(), e),
        }
    }

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
