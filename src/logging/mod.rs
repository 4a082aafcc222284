// Logging setup - tracing subscriber for the CLI
//
// Human-readable events go to stderr so they never mix with command output on
// stdout. Optionally, a second layer writes JSON lines to rotating files.
//
// Precedence for the filter: RUST_LOG env var > config level > "info".

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogRotation, LoggingConfig};

/// Directive for our own crate at `level`
fn default_directive(level: &str) -> String {
    let level = if level.trim().is_empty() { "info" } else { level.trim() };
    format!("unitrack={}", level)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive until
/// the program exits. `None` when file logging is off or its directory could
/// not be created.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !config.file_enabled {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(stderr)
            .init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            config.file_dir, e
        );
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(stderr)
            .init();
        return None;
    }

    let file_appender = match config.file_rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix),
        LogRotation::Never => tracing_appender::rolling::never(&config.file_dir, &config.file_prefix),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Structured JSON for the file, plain text for the terminal
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(stderr)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}
