//! Effective level and sink parameter resolution.
//!
//! # Precedence
//! ```text
//! system modules:   log.system.log_levels[normalized module]
//!                       → log.system.log_level_default
//!                       → DEFAULT_LOG_LEVEL
//! request module:   log.request.log_levels[normalized service]
//!                       → log.request.log_level_default
//!                       → DEFAULT_LOG_LEVEL
//! ```
//!
//! Sink parameters come from the module's class when that class is
//! configured, otherwise from the hardcoded default module config. An
//! unknown level string is skipped and the next step of the chain applies.
//!
//! Everything here is a pure function of its inputs.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::schema::{
    LogConfig, LogModuleConfig, DEFAULT_LOG_LEVEL, DEFAULT_STACK_TRACE_LEVEL,
};
use crate::identity::{normalize_module, LoggerIdentity, ModuleClass};
use crate::level::LogLevel;

/// Everything a sink factory needs to build one identity's sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub module: String,
    pub service: String,
    pub class: ModuleClass,
    /// False when the hardcoded default module config was used.
    pub class_configured: bool,
    pub level: LogLevel,
    pub file_path: PathBuf,
    pub max_age: u32,
    /// Hours between rotations; the file sink rounds this to hourly or daily.
    pub rotation_time: u32,
    /// Size limit in megabytes; ignored by the built-in file sink.
    pub rotation_size: u64,
    pub log_in_console: bool,
    pub show_color: bool,
    pub json_format: bool,
    pub stack_trace_level: LogLevel,
}

fn section(class: ModuleClass, config: &LogConfig) -> &LogModuleConfig {
    match class {
        ModuleClass::System => &config.log.system,
        ModuleClass::Request => &config.log.request,
    }
}

fn override_key(identity: &LoggerIdentity, class: ModuleClass) -> String {
    match class {
        ModuleClass::System => identity.normalized_module(),
        ModuleClass::Request => normalize_module(identity.service()),
    }
}

fn parse_level(value: Option<&String>) -> Option<LogLevel> {
    value.and_then(|v| v.parse().ok())
}

/// Effective level for `identity` under `config`.
pub fn resolve_level(identity: &LoggerIdentity, config: &LogConfig) -> LogLevel {
    let class = identity.class();
    let section = section(class, config);
    let key = override_key(identity, class);

    let overridden = if key.is_empty() {
        None
    } else {
        parse_level(section.log_levels.get(&key))
    };

    overridden
        .or_else(|| parse_level(Some(&section.log_level_default)))
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Full per-identity configuration under `config`.
pub fn resolve(identity: &LoggerIdentity, config: &LogConfig) -> ResolvedConfig {
    let class = identity.class();
    let configured = section(class, config);
    let class_configured = configured.is_configured();
    let fallback;
    let params = if class_configured {
        configured
    } else {
        fallback = LogModuleConfig::hardcoded_default();
        &fallback
    };

    ResolvedConfig {
        module: identity.module().to_string(),
        service: identity.service().to_string(),
        class,
        class_configured,
        level: resolve_level(identity, config),
        file_path: PathBuf::from(&params.file_path),
        max_age: params.max_age,
        rotation_time: params.rotation_time,
        rotation_size: params.rotation_size,
        log_in_console: params.log_in_console,
        show_color: params.show_color,
        json_format: params.json_format,
        stack_trace_level: LogLevel::parse_or(&params.stack_trace_level, DEFAULT_STACK_TRACE_LEVEL),
    }
}
