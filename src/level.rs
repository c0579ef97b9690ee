//! Severity levels and live level handles.
//!
//! # Responsibilities
//! - Define the severity ladder used by every logger
//! - Parse level strings coming from configuration
//! - Provide `LevelHandle`, a shareable threshold that can be retuned in place
//!
//! # Design Decisions
//! - Levels are stored as `u8` so a handle is a single atomic load on the hot path
//! - Parsing is case-insensitive; unknown strings are an error the caller falls back on

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::UnknownLevel;

/// Severity of a log record, lowest first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Only meaningful as a stack-trace trigger threshold.
    Panic = 4,
    /// Only meaningful as a stack-trace trigger threshold.
    Fatal = 5,
}

impl LogLevel {
    /// Upper-case name as it appears in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Parse a level string, substituting `fallback` for empty or unknown input.
    pub fn parse_or(value: &str, fallback: LogLevel) -> LogLevel {
        value.parse().unwrap_or(fallback)
    }
}

impl From<u8> for LogLevel {
    fn from(val: u8) -> Self {
        match val {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            4 => LogLevel::Panic,
            _ => LogLevel::Fatal,
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "PANIC" => Ok(LogLevel::Panic),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live, shared severity threshold.
///
/// Cloning yields another reference to the same threshold, so a controller can
/// keep one clone and retune the level seen by a sink that owns the other.
#[derive(Debug, Clone)]
pub struct LevelHandle {
    inner: Arc<AtomicU8>,
}

impl LevelHandle {
    pub fn new(level: LogLevel) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from(self.inner.load(Ordering::Acquire))
    }

    /// Replace the threshold for every holder of this handle.
    pub fn set_level(&self, level: LogLevel) {
        self.inner.store(level as u8, Ordering::Release);
    }

    /// True if a record at `level` passes the threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// True if both handles point at the same threshold.
    pub fn same_handle(&self, other: &LevelHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
