//! File-backed `log` sink. The terminal is owned by the UI, so records go to
//! a file or nowhere.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

struct FileLogger {
    file: Mutex<File>,
    started: Instant,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed();
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{:>4}.{:03}] {:<5} {}: {}",
                elapsed.as_secs(),
                elapsed.subsec_millis(),
                record.level(),
                record.target(),
                record.args()
            );
            let _ = file.flush();
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("a logger is already installed")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Install a logger writing to `path` (truncated) at `level`.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), LoggingError> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let logger = FileLogger {
        file: Mutex::new(file),
        started: Instant::now(),
        level,
    };
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
