//! File logging with daily rotation and bounded retention. Every log line
//! also gets written to disk so a post-mortem on a crashed consumer doesn't
//! depend on whatever scrollback the terminal kept.

use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const LOG_RETENTION_HOURS: i64 = 24;
const MAX_LOG_FILES: usize = 7;
const CLEANUP_INTERVAL_WRITES: u64 = 1000;
const FILE_BUFFER_SIZE: usize = 4 * 1024;
const LOG_FILE_PREFIX: &str = "core-pipeline_";

struct FileLogger {
    writer: BufWriter<File>,
    log_dir: PathBuf,
    write_count: u64,
}

impl FileLogger {
    fn new() -> std::io::Result<Self> {
        let log_dir = log_directory();
        fs::create_dir_all(&log_dir)?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let log_path = log_dir.join(format!("{LOG_FILE_PREFIX}{timestamp}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        let latest_link = log_dir.join("latest.log");
        let _ = fs::remove_file(&latest_link);
        #[cfg(unix)]
        let _ = std::os::unix::fs::symlink(&log_path, &latest_link);

        Ok(Self { writer: BufWriter::with_capacity(FILE_BUFFER_SIZE, file), log_dir, write_count: 0 })
    }

    fn write_line(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{message}")?;
        self.writer.flush()?;

        self.write_count += 1;
        if self.write_count % CLEANUP_INTERVAL_WRITES == 0 {
            let log_dir = self.log_dir.clone();
            tokio::task::spawn_blocking(move || cleanup_old_logs(&log_dir));
        }
        Ok(())
    }
}

fn log_directory() -> PathBuf {
    std::env::var("CORE_PIPELINE_LOG_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("logs"))
}

/// Deletes log files older than the retention window, then trims anything
/// left over past `MAX_LOG_FILES` (oldest-first), matching the
/// retention policy this crate's operational logs are expected to honor.
fn cleanup_old_logs(log_dir: &std::path::Path) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };
    let cutoff = Local::now() - chrono::Duration::hours(LOG_RETENTION_HOURS);

    let mut log_files: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log")
        })
        .collect();
    log_files.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());

    log_files.retain(|entry| {
        let modified = entry.metadata().and_then(|m| m.modified()).ok();
        let past_retention = modified
            .map(|m| chrono::DateTime::<Local>::from(m) < cutoff)
            .unwrap_or(false);
        if past_retention {
            let _ = fs::remove_file(entry.path());
            false
        } else {
            true
        }
    });

    if log_files.len() > MAX_LOG_FILES {
        for entry in log_files.iter().take(log_files.len() - MAX_LOG_FILES) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

static FILE_LOGGER: Lazy<Mutex<Option<FileLogger>>> = Lazy::new(|| {
    match FileLogger::new() {
        Ok(logger) => Mutex::new(Some(logger)),
        Err(e) => {
            eprintln!("failed to initialize file logger: {e}");
            Mutex::new(None)
        }
    }
});

pub fn init_file_logging() {
    Lazy::force(&FILE_LOGGER);
}

pub fn flush_file_logging() {
    if let Ok(mut guard) = FILE_LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            let _ = logger.writer.flush();
        }
    }
}

pub fn write_to_file(message: &str) {
    static DROPPED: AtomicU64 = AtomicU64::new(0);

    let Ok(mut guard) = FILE_LOGGER.try_lock() else {
        let dropped = DROPPED.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped % 1000 == 0 {
            eprintln!("dropped {dropped} log lines while file logger was busy");
        }
        return;
    };
    if let Some(logger) = guard.as_mut() {
        let _ = logger.write_line(&strip_ansi_codes(message));
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_escape = false;
    for ch in text.chars() {
        match ch {
            '\x1b' => in_escape = true,
            'm' if in_escape => in_escape = false,
            _ if !in_escape => result.push(ch),
            _ => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_codes_removes_color_sequences() {
        assert_eq!(strip_ansi_codes("\x1b[31mred\x1b[0m text"), "red text");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }
}
