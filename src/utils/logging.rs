//! Logging initialization for ncd-flasher

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

/// Map `-v`/`-q` flags to a level filter
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Directory holding the TUI log file
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::APP_NAME)
        .join("logs")
}

/// Initialize logging for the CLI and TUI
pub fn init_cli_logging(verbose: u8, quiet: bool, tui_mode: bool) -> Result<()> {
    let level = level_for(verbose, quiet);

    if tui_mode {
        // The terminal belongs to ratatui
        init_file_logger(level)?;
    } else {
        Builder::from_default_env()
            .target(Target::Stderr)
            .filter_level(level)
            .format_timestamp_secs()
            .format_module_path(false)
            .init();
    }

    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("ncd-flasher logging initialized with level: {:?}", level);
    Ok(())
}

fn init_file_logger(level: LevelFilter) -> Result<()> {
    use std::fs::OpenOptions;

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_file = log_dir.join(format!("{}.log", crate::APP_NAME));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    Builder::from_default_env()
        .target(Target::Pipe(Box::new(file)))
        .filter_level(level)
        .format_timestamp_secs()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();

    Ok(())
}
