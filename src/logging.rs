use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(clap::ValueEnum, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        LevelFilter::from_level(level.into())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingOptions {
    pub console_level: LogLevel,
    pub write_to_file: bool,
    pub file_level: LogLevel,
    pub file_destination: PathBuf,
    pub file_prefix: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            console_level: LogLevel::Warn,
            write_to_file: false,
            file_level: LogLevel::Debug,
            file_destination: Config::default_dirs().state.clone(),
            file_prefix: "eew-buddy.log".to_string(),
        }
    }
}

/// Log to stderr and optionally to a daily rotated file. The returned guard
/// must be held until exit or buffered file output is lost.
pub fn setup_logging(opts: &LoggingOptions) -> Option<WorkerGuard> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::from(opts.console_level));

    if !opts.write_to_file {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&opts.file_destination, &opts.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(LevelFilter::from(opts.file_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Some(guard)
}
