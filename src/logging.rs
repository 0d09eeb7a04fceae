use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::SchedulerConfig;

pub const LOG_FILE_PREFIX: &str = "woord-srs.log";

/// Keeps the background file writer alive; drop it only at shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Daily-rolling appender under `config.log_dir`, or `None` when file logs
/// are disabled or the directory cannot be created.
pub fn file_appender(config: &SchedulerConfig) -> Option<RollingFileAppender> {
    if !config.file_logs {
        return None;
    }
    // The subscriber is not installed yet, so this cannot go through tracing
    if let Err(err) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("failed to create log directory {}: {err}", config.log_dir);
        return None;
    }
    Some(RollingFileAppender::new(
        Rotation::DAILY,
        &config.log_dir,
        LOG_FILE_PREFIX,
    ))
}

/// Installs the global subscriber. Console output goes to stderr so stdout
/// stays reserved for the JSON schedule.
pub fn init_tracing(config: &SchedulerConfig) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match file_appender(config) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .init();

    if let Some(dir) = guard.as_ref().map(|_| &config.log_dir) {
        tracing::info!(log_dir = %dir, "file logging enabled");
    }

    guard
}
