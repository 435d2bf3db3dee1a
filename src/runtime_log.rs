use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeLogEntry {
    pub timestamp_unix_ms: u128,
    pub level: LogLevel,
    pub event: String,
    pub message: String,
}

pub fn default_log_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mindmate").join("runtime.log")
}

pub fn current_unix_ms() -> Result<u128, String> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .map_err(|error| error.to_string())
}

/// Appends one JSON line to the runtime log.
pub fn append(path: &Path, level: LogLevel, event: &str, message: &str) -> Result<(), String> {
    let parent = path
        .parent()
        .ok_or_else(|| "log path has no parent directory".to_string())?;
    fs::create_dir_all(parent).map_err(io_to_string)?;

    let line = serde_json::to_string(&RuntimeLogEntry {
        timestamp_unix_ms: current_unix_ms()?,
        level,
        event: event.to_string(),
        message: message.to_string(),
    })
    .map_err(|error| error.to_string())?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_to_string)?;
    writeln!(file, "{line}").map_err(io_to_string)
}

pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<RuntimeLogEntry>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path).map_err(io_to_string)?;
    let entries = contents
        .lines()
        .filter_map(|line| serde_json::from_str::<RuntimeLogEntry>(line).ok())
        .collect::<Vec<_>>();
    let skip = entries.len().saturating_sub(limit);
    Ok(entries.into_iter().skip(skip).collect())
}

pub fn clear(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_file(path).map_err(io_to_string)
}

/// Handle passed to components that log best-effort.
#[derive(Debug, Clone)]
pub struct RuntimeLog {
    path: Option<PathBuf>,
}

impl RuntimeLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A log that drops every entry.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.write(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.write(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.write(LogLevel::Error, event, message);
    }

    fn write(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(path) = &self.path {
            let _ = append(path, level, event, message);
        }
    }
}

fn io_to_string(error: io::Error) -> String {
    error.to_string()
}

#[cfg(test)]
pub(crate) fn temp_path(prefix: &str, name: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be set")
        .as_nanos();
    std::env::temp_dir().join(format!("mindmate-{prefix}-{name}-{nanos}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_and_reads_recent_logs() {
        let path = temp_path("runtime", "append", "log");
        append(&path, LogLevel::Info, "start", "app started").expect("first log should write");
        append(&path, LogLevel::Warn, "tick", "heartbeat").expect("second log should write");

        let recent = read_recent(&path, 1).expect("recent logs should read");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].event, "tick");
        assert_eq!(recent[0].level, LogLevel::Warn);

        let _ = clear(&path);
    }

    #[test]
    fn clear_removes_log_file() {
        let path = temp_path("runtime", "clear", "log");
        append(&path, LogLevel::Info, "start", "app started").expect("log should write");
        clear(&path).expect("clear should remove file");
        assert!(!path.exists());
    }

    #[test]
    fn handle_writes_through_and_disabled_handle_is_silent() {
        let path = temp_path("runtime", "handle", "log");
        RuntimeLog::new(path.clone()).error("chat.error", "backend down");
        RuntimeLog::disabled().info("ignored", "never written");

        let recent = read_recent(&path, 10).expect("recent logs should read");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].level, LogLevel::Error);
        assert_eq!(recent[0].message, "backend down");

        let _ = clear(&path);
    }
}
