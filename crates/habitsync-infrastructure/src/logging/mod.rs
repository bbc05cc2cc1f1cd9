//! Logging bootstrap.
//!
//! Human-readable output on stdout, daily-rotated plain files on disk,
//! `log`-macro records forwarded into `tracing`. Filtering follows
//! `RUST_LOG`, defaulting to `info`.

use std::path::PathBuf;
use std::sync::OnceLock;

use log::LevelFilter;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Platform-local default log directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("habitsync")
        .join("logs")
}

/// Initialize the logging stack. Safe to call more than once; only the
/// first call takes effect.
pub fn init_logging(log_dir: PathBuf) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;

    // Forward log-crate records into tracing
    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, "habitsync.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter());

    let stdout_layer = fmt::layer().compact().with_filter(env_filter());

    let subscriber = Registry::default().with(file_layer).with(stdout_layer);
    // Another subscriber may already be installed (tests); keep going.
    let _ = tracing::subscriber::set_global_default(subscriber);

    let _ = LOGGER_READY.set(());
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
