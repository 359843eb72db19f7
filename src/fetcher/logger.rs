//! Structured Logging for Image Fetcher
//!
//! This module provides functionality for:
//! 1. Writing diagnostics to a daily rolling file in JSON or line format
//! 2. Honouring `RUST_LOG` over the configured level
//! 3. Keeping the terminal free for the interactive front end

use std::path::Path;

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, time::ChronoUtc},
    prelude::*,
    EnvFilter,
};

use crate::fetcher::AppConfig;

/// File name prefix of the rolling log
const LOG_FILE_NAME: &str = "image_fetcher.log";

/// Error types for logging
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type for logging operations
pub type LoggerResult<T> = Result<T, LoggerError>;

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LoggerGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber using the logging section of `config`.
///
/// The log directory must already exist.
pub fn init_logger(config: &AppConfig) -> LoggerResult<LoggerGuard> {
    let guard = install(
        &config.paths.log_directory,
        &config.logging.log_format,
        &config.logging.log_level,
    )?;
    Ok(LoggerGuard { _guard: guard })
}

fn install(log_dir: &Path, format: &str, level: &str) -> LoggerResult<WorkerGuard> {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = build_filter(level)?;

    let layer = match format {
        "json" => fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_timer(ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        _ => fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_timer(ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| LoggerError::Logging(e.to_string()))?;

    info!(
        log_format = format,
        log_level = level,
        log_directory = %log_dir.display(),
        "Logger initialized"
    );

    Ok(guard)
}

/// `RUST_LOG` wins over the configured level when it is set and valid.
fn build_filter(level: &str) -> LoggerResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| LoggerError::Filter(e.to_string()))
}
