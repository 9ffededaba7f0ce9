//! Process-wide `tracing` subscriber setup.
//!
//! Console output is always enabled; when `LOG_DIR` is set, a daily-rolling file is written too.
//! The returned [`LoggerGuard`] flushes the file writer on drop, so keep it alive in `main`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config_variant::ConfigVariant;

pub const LOG_DIR_ENV: &str = "LOG_DIR";
pub const LOG_FILE_NAME: &str = "crypto_provider.log";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub struct LoggerGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber. Repeated calls keep the first subscriber.
pub fn init_logger() -> LoggerGuard {
    let variant = ConfigVariant::init();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_ansi(variant == ConfigVariant::Local);

    let (file_layer, file_guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    tracing::debug!("Logger initialized, variant: {variant}");
    LoggerGuard {
        _file_guard: file_guard,
    }
}
