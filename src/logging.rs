//! Debug-build tracing: `logs/partstage.log` plus coloured stdout.
//!
//! Release builds leave logging to Bevy's own `LogPlugin`.
#![cfg_attr(not(debug_assertions), allow(dead_code))]

use std::io::Write;
use std::path::Path;

pub const LOG_FILE: &str = "partstage.log";

/// `RUST_LOG` overrides this
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,partstage=debug";

/// Banner appended to the log file so separate runs are easy to tell apart
pub fn session_header(started: chrono::DateTime<chrono::Local>) -> String {
    let rule = "=".repeat(80);
    format!(
        "\n{rule}\n=== partstage {} session started {} ===\n{rule}\n",
        env!("CARGO_PKG_VERSION"),
        started.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn append_session_header(log_file: &Path) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    write!(file, "{}", session_header(chrono::Local::now()))
}

/// Install the file and stdout subscriber. The returned guard flushes the
/// file writer and must live until exit.
#[cfg(debug_assertions)]
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let logs_dir = crate::paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("Cannot create {}: {}", logs_dir.display(), e);
        return None;
    }
    if let Err(e) = append_session_header(&logs_dir.join(LOG_FILE)) {
        eprintln!("Cannot write to {}: {}", LOG_FILE, e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs_dir, LOG_FILE));

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    Some(guard)
}

#[cfg(not(debug_assertions))]
pub fn init() -> Option<()> {
    None
}
