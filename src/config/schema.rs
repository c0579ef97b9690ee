//! Configuration schema definitions.
//!
//! This module defines the layered logging configuration: one section per
//! module class, each with a default level, per-module overrides and the
//! parameters handed to the sink. All types derive Serde traits for
//! deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::normalize_module;
use crate::level::LogLevel;

/// Level used when neither an override nor a class default applies.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Debug;
/// Output path used while a class is unconfigured.
pub const DEFAULT_FILE_PATH: &str = "./default.log";
/// Days rotated files are retained.
pub const DEFAULT_MAX_AGE: u32 = 365;
/// Hours between rotations. The file sink rotates hourly for any period
/// under a day, so six hours yields hourly files.
pub const DEFAULT_ROTATION_TIME: u32 = 6;
/// Megabytes per file before a size-triggered rotation. Carried to the
/// sink factory; the built-in file sink rotates by time only.
pub const DEFAULT_ROTATION_SIZE: u64 = 100;
pub const DEFAULT_STACK_TRACE_LEVEL: LogLevel = LogLevel::Panic;

/// Root logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// File this configuration was read from, if any.
    pub config_file: String,

    /// Per-class module configuration.
    pub log: LoggerIns,
}

/// The two module classes.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggerIns {
    /// The reserved request module.
    pub request: LogModuleConfig,

    /// Every other module.
    pub system: LogModuleConfig,
}

/// Configuration of one module class.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogModuleConfig {
    /// Class default level. Empty means the class is unconfigured.
    pub log_level_default: String,

    /// Normalized module name (or request service name) → level.
    pub log_levels: HashMap<String, String>,

    /// Output file path.
    pub file_path: String,

    /// Days to keep rotated files (0 = keep all).
    pub max_age: u32,

    /// Hours between rotations (0 = never rotate on time).
    ///
    /// The file sink rounds this to its appender periods: 1 to 23 rotates
    /// hourly and 24 or more rotates daily. Rotated files are named
    /// `<file>.YYYY-MM-DD-HH` or `<file>.YYYY-MM-DD`; only 0 writes to
    /// `file_path` itself.
    pub rotation_time: u32,

    /// Megabytes per file before rotation (0 = no size limit).
    ///
    /// Not enforced by the built-in file sink, which rotates by time only.
    pub rotation_size: u64,

    /// Echo records to stdout.
    pub log_in_console: bool,

    /// ANSI color on the console echo.
    pub show_color: bool,

    /// JSON records in the file instead of text.
    pub json_format: bool,

    /// Records at or above this level carry a backtrace.
    pub stack_trace_level: String,
}

impl Default for LogModuleConfig {
    fn default() -> Self {
        Self {
            log_level_default: String::new(),
            log_levels: HashMap::new(),
            file_path: String::new(),
            max_age: DEFAULT_MAX_AGE,
            rotation_time: DEFAULT_ROTATION_TIME,
            rotation_size: DEFAULT_ROTATION_SIZE,
            log_in_console: false,
            show_color: false,
            json_format: true,
            stack_trace_level: String::new(),
        }
    }
}

impl LogModuleConfig {
    /// The hardcoded module configuration used by unconfigured classes.
    pub fn hardcoded_default() -> Self {
        Self {
            log_level_default: DEFAULT_LOG_LEVEL.as_str().to_string(),
            log_levels: HashMap::new(),
            file_path: DEFAULT_FILE_PATH.to_string(),
            max_age: DEFAULT_MAX_AGE,
            rotation_time: DEFAULT_ROTATION_TIME,
            rotation_size: DEFAULT_ROTATION_SIZE,
            log_in_console: true,
            show_color: true,
            json_format: false,
            stack_trace_level: DEFAULT_STACK_TRACE_LEVEL.as_str().to_string(),
        }
    }

    /// A class counts as configured once it names a default level.
    pub fn is_configured(&self) -> bool {
        !self.log_level_default.trim().is_empty()
    }

    fn normalize_keys(&mut self) {
        self.log_levels = self
            .log_levels
            .drain()
            .map(|(name, level)| (normalize_module(&name), level))
            .collect();
    }
}

impl LogConfig {
    /// A configuration with both classes set to the hardcoded defaults.
    pub fn with_defaults() -> Self {
        Self {
            config_file: String::new(),
            log: LoggerIns {
                request: LogModuleConfig::hardcoded_default(),
                system: LogModuleConfig::hardcoded_default(),
            },
        }
    }

    /// Copy with every override key normalized, so `"[Auth]"` matches `auth`.
    pub fn normalized(mut self) -> Self {
        self.log.request.normalize_keys();
        self.log.system.normalize_keys();
        self
    }
}
