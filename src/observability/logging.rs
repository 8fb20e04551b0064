//! Request and todo log channels.
//!
//! # Responsibilities
//! - Own the two named channels (`request-logger`, `todo-logger`)
//! - Filter entries against each channel's current level
//! - Format entries with timestamp, level and request number
//! - Hand formatted lines to the channel's sinks
//! - Hand out request correlation numbers
//!
//! # Design Decisions
//! - Levels are atomics; a change applies to the next entry only
//! - Sinks are a trait so files, the console and tests plug in alike
//! - A failed sink write is reported through `tracing` and otherwise ignored
//! - Process-level events (startup, reloads) go through `tracing`, not here

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LoggingConfig;

/// Channel severity. Ordered `Debug < Info < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 10,
    Info = 20,
    Error = 40,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }

    /// Inverse of `level as u8`. Only values written by `LogChannel` reach it.
    fn from_repr(value: u8) -> Self {
        match value {
            v if v == LogLevel::Debug as u8 => LogLevel::Debug,
            v if v == LogLevel::Info as u8 => LogLevel::Info,
            v if v == LogLevel::Error as u8 => LogLevel::Error,
            other => unreachable!("no log level with discriminant {}", other),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(LoggingError::InvalidLevel(other.to_string())),
        }
    }
}

/// The two channels owned by the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelName {
    Request,
    Todo,
}

impl ChannelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelName::Request => "request-logger",
            ChannelName::Todo => "todo-logger",
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelName {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request-logger" => Ok(ChannelName::Request),
            "todo-logger" => Ok(ChannelName::Todo),
            other => Err(LoggingError::InvalidChannel(other.to_string())),
        }
    }
}

/// Errors from querying or changing channel levels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("Error: Invalid input")]
    InvalidChannel(String),

    #[error("Error: Invalid input")]
    InvalidLevel(String),

    /// The query string itself could not be read.
    #[error("Error: Invalid input")]
    InvalidQuery(String),
}

/// Destination for formatted log lines.
pub trait LogSink: Send + Sync {
    /// Append one line. `line` carries no trailing newline.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Short label used when reporting write failures.
    fn describe(&self) -> String;
}

/// Append-only log file.
///
/// The file is truncated when the sink is created. Every write opens the
/// file in append mode, writes one line and closes it again.
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    /// Create (or truncate) the file at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        File::create(&path)?;

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().expect("file sink mutex poisoned");
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Echoes lines to stdout.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line)
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}

/// Keeps lines in memory. Useful for inspecting channel output.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("memory sink mutex poisoned").clone()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .expect("memory sink mutex poisoned")
            .push(line.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

struct SinkTarget {
    sink: Arc<dyn LogSink>,
    /// Entries below this level skip the sink even if the channel accepts them.
    min_level: LogLevel,
}

/// A named log stream with a runtime-adjustable threshold.
pub struct LogChannel {
    name: ChannelName,
    level: AtomicU8,
    sinks: Vec<SinkTarget>,
}

impl LogChannel {
    pub fn new(name: ChannelName, level: LogLevel) -> Self {
        Self {
            name,
            level: AtomicU8::new(level as u8),
            sinks: Vec::new(),
        }
    }

    /// Attach a sink that receives entries at `min_level` or above.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, min_level: LogLevel) -> Self {
        self.sinks.push(SinkTarget { sink, min_level });
        self
    }

    pub fn name(&self) -> ChannelName {
        self.name
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_repr(self.level.load(Ordering::SeqCst))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Write an entry unless it is below the channel's current level.
    pub fn log(&self, level: LogLevel, request: u64, message: &str) {
        if level < self.level() {
            return;
        }

        let line = format_entry(level, request, message);
        for target in self.sinks.iter().filter(|t| level >= t.min_level) {
            if let Err(e) = target.sink.write_line(&line) {
                tracing::warn!(
                    channel = %self.name,
                    sink = %target.sink.describe(),
                    error = %e,
                    "Failed to write log entry"
                );
            }
        }
    }

    pub fn debug(&self, request: u64, message: &str) {
        self.log(LogLevel::Debug, request, message);
    }

    pub fn info(&self, request: u64, message: &str) {
        self.log(LogLevel::Info, request, message);
    }

    pub fn error(&self, request: u64, message: &str) {
        self.log(LogLevel::Error, request, message);
    }
}

/// Format one log line: `dd-mm-YYYY HH:MM:SS.mmm LEVEL : message | request: #N`.
pub fn format_entry(level: LogLevel, request: u64, message: &str) -> String {
    format_entry_at(chrono::Local::now().naive_local(), level, request, message)
}

fn format_entry_at(
    timestamp: chrono::NaiveDateTime,
    level: LogLevel,
    request: u64,
    message: &str,
) -> String {
    format!(
        "{} {} : {} | request: #{}",
        timestamp.format("%d-%m-%Y %H:%M:%S%.3f"),
        level,
        message,
        request
    )
}

/// Correlation data for one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Sequence number shared by every log entry of the request.
    pub number: u64,
    started: Instant,
}

impl RequestContext {
    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Owner of both log channels and the request counter.
pub struct LoggingFacility {
    request: LogChannel,
    todo: LogChannel,
    next_request: AtomicU64,
}

impl LoggingFacility {
    /// Build a facility from two channels. Request numbers start at 1.
    pub fn new(request: LogChannel, todo: LogChannel) -> Self {
        Self {
            request,
            todo,
            next_request: AtomicU64::new(1),
        }
    }

    /// Build the file-backed facility described by `config`.
    ///
    /// Both log files are truncated.
    pub fn from_config(config: &LoggingConfig) -> io::Result<Self> {
        let directory = Path::new(&config.directory);
        let request_file = FileSink::create(directory.join(&config.request_log_file))?;
        let todo_file = FileSink::create(directory.join(&config.todo_log_file))?;

        let mut request = LogChannel::new(ChannelName::Request, config.request_level)
            .with_sink(Arc::new(request_file), config.request_file_level);
        if config.console_echo {
            request = request.with_sink(Arc::new(ConsoleSink), LogLevel::Debug);
        }
        let todo = LogChannel::new(ChannelName::Todo, config.todo_level)
            .with_sink(Arc::new(todo_file), config.todo_file_level);

        tracing::info!(
            directory = %directory.display(),
            request_level = %config.request_level,
            todo_level = %config.todo_level,
            "Log channels initialized"
        );

        Ok(Self::new(request, todo))
    }

    pub fn channel(&self, name: ChannelName) -> &LogChannel {
        match name {
            ChannelName::Request => &self.request,
            ChannelName::Todo => &self.todo,
        }
    }

    pub fn request_channel(&self) -> &LogChannel {
        &self.request
    }

    pub fn todo_channel(&self) -> &LogChannel {
        &self.todo
    }

    /// Current level of the channel called `channel`.
    pub fn get_level(&self, channel: &str) -> Result<LogLevel, LoggingError> {
        let name: ChannelName = channel.parse()?;
        Ok(self.channel(name).level())
    }

    /// Change the level of the channel called `channel`.
    ///
    /// The channel name is validated before the level.
    pub fn set_level(&self, channel: &str, level: &str) -> Result<LogLevel, LoggingError> {
        let name: ChannelName = channel.parse()?;
        let level: LogLevel = level.parse()?;
        self.channel(name).set_level(level);
        tracing::info!(channel = %name, level = %level, "Log level changed");
        Ok(level)
    }

    /// Apply the channel levels from a reloaded configuration.
    pub fn apply_config(&self, config: &LoggingConfig) {
        self.request.set_level(config.request_level);
        self.todo.set_level(config.todo_level);
        tracing::info!(
            request_level = %config.request_level,
            todo_level = %config.todo_level,
            "Log levels reloaded from configuration"
        );
    }

    /// Reserve the correlation number for a new request.
    pub fn begin_request(&self) -> RequestContext {
        RequestContext {
            number: self.next_request.fetch_add(1, Ordering::SeqCst),
            started: Instant::now(),
        }
    }

    /// Write the request channel entries that close out a request.
    pub fn finish_request(&self, ctx: &RequestContext, resource: &str, verb: &str) {
        let elapsed_ms = ctx.elapsed().as_millis();
        self.request.info(
            ctx.number,
            &format!(
                "Incoming request | #{} | resource: {} | HTTP Verb {}",
                ctx.number,
                resource,
                verb.to_uppercase()
            ),
        );
        self.request.debug(
            ctx.number,
            &format!("request #{} duration: {}ms", ctx.number, elapsed_ms),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_facility() -> (LoggingFacility, Arc<MemorySink>, Arc<MemorySink>) {
        let requests = Arc::new(MemorySink::new());
        let todos = Arc::new(MemorySink::new());
        let facility = LoggingFacility::new(
            LogChannel::new(ChannelName::Request, LogLevel::Info)
                .with_sink(requests.clone(), LogLevel::Debug),
            LogChannel::new(ChannelName::Todo, LogLevel::Info)
                .with_sink(todos.clone(), LogLevel::Debug),
        );
        (facility, requests, todos)
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Error);
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Error] {
            assert_eq!(LogLevel::from_repr(level as u8), level);
        }
    }

    #[test]
    #[should_panic(expected = "no log level with discriminant 30")]
    fn test_unknown_discriminant_is_not_mapped() {
        LogLevel::from_repr(30);
    }

    #[test]
    fn test_entry_layout() {
        let timestamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_milli_opt(9, 5, 2, 41))
            .unwrap();

        assert_eq!(
            format_entry_at(timestamp, LogLevel::Error, 12, "Error: Invalid input"),
            "07-03-2024 09:05:02.041 ERROR : Error: Invalid input | request: #12"
        );
    }

    #[test]
    fn test_threshold_applies_to_next_entry() {
        let (facility, _, todos) = memory_facility();
        let channel = facility.todo_channel();

        channel.set_level(LogLevel::Error);
        channel.info(1, "hidden");
        assert!(todos.lines().is_empty());

        channel.set_level(LogLevel::Debug);
        channel.info(2, "visible");
        channel.debug(2, "detail");
        let lines = todos.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO : visible | request: #2"));
        assert!(lines[1].contains("DEBUG : detail"));
    }

    #[test]
    fn test_sink_minimum_level() {
        let file_like = Arc::new(MemorySink::new());
        let console_like = Arc::new(MemorySink::new());
        let channel = LogChannel::new(ChannelName::Request, LogLevel::Debug)
            .with_sink(file_like.clone(), LogLevel::Info)
            .with_sink(console_like.clone(), LogLevel::Debug);

        channel.debug(1, "only on console");
        channel.error(1, "everywhere");

        assert_eq!(file_like.lines().len(), 1);
        assert_eq!(console_like.lines().len(), 2);
    }

    #[test]
    fn test_get_and_set_level() {
        let (facility, _, _) = memory_facility();

        assert_eq!(facility.get_level("request-logger").unwrap(), LogLevel::Info);
        assert_eq!(
            facility.set_level("todo-logger", "DEBUG").unwrap(),
            LogLevel::Debug
        );
        assert_eq!(facility.get_level("todo-logger").unwrap(), LogLevel::Debug);
        assert_eq!(facility.get_level("request-logger").unwrap(), LogLevel::Info);

        assert_eq!(
            facility.get_level("root").unwrap_err(),
            LoggingError::InvalidChannel("root".into())
        );
        assert_eq!(
            facility.set_level("todo-logger", "WARN").unwrap_err(),
            LoggingError::InvalidLevel("WARN".into())
        );
        // Channel is checked first.
        assert_eq!(
            facility.set_level("root", "WARN").unwrap_err(),
            LoggingError::InvalidChannel("root".into())
        );
    }

    #[test]
    fn test_request_numbers_and_narrative() {
        let (facility, requests, _) = memory_facility();
        facility.request_channel().set_level(LogLevel::Debug);

        let first = facility.begin_request();
        facility.finish_request(&first, "/todo/health", "get");
        let second = facility.begin_request();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);

        let lines = requests.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(
            "INFO : Incoming request | #1 | resource: /todo/health | HTTP Verb GET | request: #1"
        ));
        assert!(lines[1].contains("DEBUG : request #1 duration: "));
    }

    #[test]
    fn test_apply_config() {
        let (facility, _, _) = memory_facility();
        let config = LoggingConfig {
            request_level: LogLevel::Error,
            todo_level: LogLevel::Debug,
            ..LoggingConfig::default()
        };
        facility.apply_config(&config);

        assert_eq!(facility.request_channel().level(), LogLevel::Error);
        assert_eq!(facility.todo_channel().level(), LogLevel::Debug);
    }

    #[test]
    fn test_file_sink_truncates_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todos.log");

        let sink = FileSink::create(&path).unwrap();
        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        let sink = FileSink::create(&path).unwrap();
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "");
    }

    #[test]
    fn test_from_config_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().display().to_string(),
            console_echo: false,
            ..LoggingConfig::default()
        };
        let facility = LoggingFacility::from_config(&config).unwrap();

        facility.todo_channel().info(1, "todo entry");
        facility.request_channel().set_level(LogLevel::Debug);
        let ctx = facility.begin_request();
        facility.finish_request(&ctx, "/todo", "POST");

        let todos = fs::read_to_string(dir.path().join("todos.log")).unwrap();
        assert!(todos.contains("INFO : todo entry | request: #1"));

        // Request file stays at INFO even if the channel is lowered.
        let requests = fs::read_to_string(dir.path().join("requests.log")).unwrap();
        assert_eq!(requests.lines().count(), 1);
    }
}
