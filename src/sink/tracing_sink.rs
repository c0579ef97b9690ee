//! Production sink built on `tracing-subscriber` and `tracing-appender`.
//!
//! # Responsibilities
//! - Open a rolling log file per identity (JSON or text)
//! - Optionally echo records to stdout, with or without ANSI color
//! - Attach a backtrace to records at or above the stack-trace level
//! - Carry the record's severity and any key/value fields
//!
//! # Design Decisions
//! - Each sink owns a private `Dispatch`; records are emitted with
//!   `dispatcher::with_default`, so sinks never touch the global subscriber
//! - The appender rotates by time only: `rotation_time` picks hourly or daily
//!   files and `max_age` becomes the number of files retained

use std::backtrace::Backtrace;
use std::fmt::{Arguments, Display};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer, Registry};

use crate::error::SinkConstructionError;
use crate::identity::LoggerIdentity;
use crate::level::{LevelHandle, LogLevel};
use crate::resolver::ResolvedConfig;
use crate::sink::{BuiltSink, KeyValues, Sink, SinkFactory};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Fields attached to every record.
struct RecordFields<'a> {
    module: &'a str,
    service: &'a str,
    backtrace: Option<&'a Backtrace>,
    kv: Option<KeyValues<'a>>,
}

macro_rules! record {
    ($lvl:ident, $severity:expr, $fields:ident, $args:ident) => {
        tracing::event!(
            target: "modlog",
            tracing::Level::$lvl,
            module = %$fields.module,
            service = %$fields.service,
            severity = $severity,
            backtrace = $fields.backtrace.map(tracing::field::display),
            kv = $fields.kv.as_ref().map(tracing::field::display),
            "{}",
            $args
        )
    };
}

/// PANIC and FATAL have no tracing level of their own; they are written at
/// ERROR and keep their name in the `severity` field.
fn emit(level: LogLevel, fields: &RecordFields<'_>, args: Arguments<'_>) {
    let severity = level.as_str();
    match level {
        LogLevel::Debug => record!(DEBUG, severity, fields, args),
        LogLevel::Info => record!(INFO, severity, fields, args),
        LogLevel::Warn => record!(WARN, severity, fields, args),
        LogLevel::Error | LogLevel::Panic | LogLevel::Fatal => {
            record!(ERROR, severity, fields, args)
        }
    }
}

/// A sink writing through its own tracing dispatcher.
pub struct TracingSink {
    dispatch: Dispatch,
    level: LevelHandle,
    module: String,
    service: String,
    stack_trace_level: LogLevel,
}

impl TracingSink {
    fn new(dispatch: Dispatch, config: &ResolvedConfig) -> Self {
        Self {
            dispatch,
            level: LevelHandle::new(config.level),
            module: config.module.clone(),
            service: config.service.clone(),
            stack_trace_level: config.stack_trace_level,
        }
    }
}

impl std::fmt::Debug for TracingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingSink")
            .field("module", &self.module)
            .field("service", &self.service)
            .field("level", &self.level.level())
            .finish()
    }
}

impl TracingSink {
    fn write(&self, level: LogLevel, kv: Option<KeyValues<'_>>, args: Arguments<'_>) {
        if !self.level.enabled(level) {
            return;
        }
        let backtrace = (level >= self.stack_trace_level).then(Backtrace::force_capture);
        let fields = RecordFields {
            module: &self.module,
            service: &self.service,
            backtrace: backtrace.as_ref(),
            kv,
        };
        tracing::dispatcher::with_default(&self.dispatch, || emit(level, &fields, args));
    }
}

impl Sink for TracingSink {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.write(level, None, args);
    }

    fn log_kv(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn Display)]) {
        let kv = (!fields.is_empty()).then(|| KeyValues(fields));
        self.write(level, kv, format_args!("{}", message));
    }

    fn level_handle(&self) -> &LevelHandle {
        &self.level
    }
}

/// Builds `TracingSink`s.
#[derive(Debug, Clone, Default)]
pub struct TracingSinkFactory {
    base_dir: Option<PathBuf>,
}

impl TracingSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative log paths against `dir` instead of the working directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn console_layer(config: &ResolvedConfig) -> BoxedLayer {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(config.show_color)
            .with_target(false)
            .boxed()
    }

    fn file_layer(&self, config: &ResolvedConfig) -> Result<BoxedLayer, SinkConstructionError> {
        let path = self.resolve_path(&config.file_path);
        let (dir, file_name) = split_path(&path)?;
        let (rotation, period_hours) = rotation_for(config.rotation_time);

        let mut builder = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(file_name);
        if let Some(max_files) = max_log_files(config.max_age, period_hours) {
            builder = builder.max_log_files(max_files);
        }
        let appender = builder.build(dir)?;

        let layer = fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(false);
        Ok(if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        })
    }
}

impl SinkFactory for TracingSinkFactory {
    fn build(
        &self,
        _identity: &LoggerIdentity,
        config: &ResolvedConfig,
    ) -> Result<BuiltSink, SinkConstructionError> {
        let mut layers = vec![self.file_layer(config)?];
        if config.log_in_console {
            layers.push(Self::console_layer(config));
        }

        let sink = TracingSink::new(Dispatch::new(Registry::default().with(layers)), config);
        let level = sink.level_handle().clone();
        Ok((Arc::new(sink), level))
    }

    fn fallback(&self, _identity: &LoggerIdentity, config: &ResolvedConfig) -> BuiltSink {
        let layers = vec![Self::console_layer(config)];
        let sink = TracingSink::new(Dispatch::new(Registry::default().with(layers)), config);
        let level = sink.level_handle().clone();
        (Arc::new(sink), level)
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, String), SinkConstructionError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SinkConstructionError::InvalidPath {
            path: path.to_path_buf(),
            reason: "path does not name a file".to_string(),
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name.to_string()))
}

/// Appender rotation for a period in hours, plus the period the files cover.
fn rotation_for(hours: u32) -> (Rotation, Option<u32>) {
    match hours {
        0 => (Rotation::NEVER, None),
        1..=23 => (Rotation::HOURLY, Some(1)),
        _ => (Rotation::DAILY, Some(24)),
    }
}

fn max_log_files(max_age_days: u32, period_hours: Option<u32>) -> Option<usize> {
    let period = u64::from(period_hours?);
    if max_age_days == 0 {
        return None;
    }
    let files = (u64::from(max_age_days) * 24 / period).max(1);
    Some(usize::try_from(files).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogConfig;
    use crate::resolver::resolve;
    use std::fs;

    fn resolved(file_path: &str, json: bool) -> ResolvedConfig {
        let mut config = LogConfig::default();
        config.log.system.log_level_default = "INFO".into();
        config.log.system.file_path = file_path.into();
        config.log.system.rotation_time = 0;
        config.log.system.json_format = json;
        config.log.system.stack_trace_level = "ERROR".into();
        resolve(&LoggerIdentity::new("[Auth]", "chain1"), &config)
    }

    fn build(dir: &Path, config: &ResolvedConfig) -> BuiltSink {
        TracingSinkFactory::with_base_dir(dir)
            .build(&LoggerIdentity::new("[Auth]", "chain1"), config)
            .unwrap()
    }

    #[test]
    fn test_rotation_mapping() {
        assert_eq!(rotation_for(0), (Rotation::NEVER, None));
        assert_eq!(rotation_for(6), (Rotation::HOURLY, Some(1)));
        assert_eq!(rotation_for(24), (Rotation::DAILY, Some(24)));
        assert_eq!(rotation_for(48), (Rotation::DAILY, Some(24)));
    }

    #[test]
    fn test_max_log_files() {
        assert_eq!(max_log_files(7, Some(24)), Some(7));
        assert_eq!(max_log_files(1, Some(1)), Some(24));
        assert_eq!(max_log_files(0, Some(1)), None);
        assert_eq!(max_log_files(30, None), None);
    }

    #[test]
    fn test_split_path() {
        let (dir, name) = split_path(Path::new("logs/system.log")).unwrap();
        assert_eq!(dir, PathBuf::from("logs"));
        assert_eq!(name, "system.log");

        let (dir, _) = split_path(Path::new("system.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));

        assert!(split_path(Path::new("")).is_err());
    }

    #[test]
    fn test_writes_text_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolved("logs/system.log", false);
        let (sink, _) = build(dir.path(), &config);

        sink.log(LogLevel::Info, format_args!("peer {} connected", 7));
        sink.log(LogLevel::Debug, format_args!("hidden"));

        let contents = fs::read_to_string(dir.path().join("logs/system.log")).unwrap();
        assert!(contents.contains("peer 7 connected"));
        assert!(contents.contains("[Auth]"));
        assert!(contents.contains("chain1"));
        assert!(!contents.contains("hidden"));
    }

    #[test]
    fn test_writes_json_records_with_backtrace() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolved("system.json", true);
        let (sink, _) = build(dir.path(), &config);

        sink.log(LogLevel::Warn, format_args!("slow block"));
        sink.log(LogLevel::Error, format_args!("bad block"));

        let contents = fs::read_to_string(dir.path().join("system.json")).unwrap();
        let records: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["level"], "WARN");
        assert_eq!(records[0]["fields"]["message"], "slow block");
        assert_eq!(records[0]["fields"]["module"], "[Auth]");
        assert!(records[0]["fields"].get("backtrace").is_none());
        assert_eq!(records[1]["level"], "ERROR");
        assert!(records[1]["fields"].get("backtrace").is_some());
    }

    #[test]
    fn test_json_records_keep_severity_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolved("severity.json", true);
        let (sink, _) = build(dir.path(), &config);

        sink.log(LogLevel::Fatal, format_args!("disk gone"));
        sink.log(LogLevel::Panic, format_args!("state corrupt"));
        sink.log_kv(LogLevel::Info, "peer connected", &[("peer", &"p1"), ("attempt", &2)]);

        let contents = fs::read_to_string(dir.path().join("severity.json")).unwrap();
        let records: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0]["level"], "ERROR");
        assert_eq!(records[0]["fields"]["severity"], "FATAL");
        assert!(records[0]["fields"].get("backtrace").is_some());
        assert_eq!(records[1]["fields"]["severity"], "PANIC");

        assert_eq!(records[2]["fields"]["severity"], "INFO");
        assert_eq!(records[2]["fields"]["message"], "peer connected");
        assert_eq!(records[2]["fields"]["kv"], "peer=p1 attempt=2");
    }

    #[test]
    fn test_level_handle_retunes_sink() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolved("system.log", false);
        let (sink, level) = build(dir.path(), &config);

        level.set_level(LogLevel::Error);
        sink.log(LogLevel::Warn, format_args!("suppressed"));
        level.set_level(LogLevel::Debug);
        sink.log(LogLevel::Debug, format_args!("now visible"));

        let contents = fs::read_to_string(dir.path().join("system.log")).unwrap();
        assert!(!contents.contains("suppressed"));
        assert!(contents.contains("now visible"));
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let config = resolved("blocker/nested/system.log", false);
        let result = TracingSinkFactory::with_base_dir(dir.path())
            .build(&LoggerIdentity::new("[Auth]", ""), &config);
        assert!(matches!(result, Err(SinkConstructionError::Appender(_))));
    }

    #[test]
    fn test_fallback_never_fails() {
        let config = resolved("", false);
        let (sink, level) =
            TracingSinkFactory::new().fallback(&LoggerIdentity::new("[Auth]", ""), &config);
        assert_eq!(level.level(), LogLevel::Info);
        assert!(sink.level_handle().same_handle(&level));
    }
}
