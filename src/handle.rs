//! Per-identity logger handle.
//!
//! # Responsibilities
//! - Hand callers a stable object they can keep for the process lifetime
//! - Route log calls to the current sink
//! - Let the controller swap the sink without callers reacquiring anything
//!
//! # Design Decisions
//! - The sink lives behind an `RwLock<Arc<dyn Sink>>`: log calls take a read
//!   lock just long enough to clone the `Arc`, swaps take the write lock
//! - Swaps replace the sink, never mutate it; a record racing a swap lands
//!   on either the old or the new sink
//! - The cached level only short-circuits deferred messages; a stale value
//!   for one call is harmless because the sink filters again

use std::fmt::{self, Arguments};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::identity::LoggerIdentity;
use crate::level::LogLevel;
use crate::sink::Sink;

/// Logger for one (module, service) identity.
pub struct LoggerHandle {
    identity: LoggerIdentity,
    sink: RwLock<Arc<dyn Sink>>,
    level: AtomicU8,
}

impl LoggerHandle {
    pub fn new(identity: LoggerIdentity, sink: Arc<dyn Sink>, level: LogLevel) -> Self {
        Self {
            identity,
            sink: RwLock::new(sink),
            level: AtomicU8::new(level as u8),
        }
    }

    pub fn identity(&self) -> &LoggerIdentity {
        &self.identity
    }

    pub fn module(&self) -> &str {
        self.identity.module()
    }

    pub fn service_name(&self) -> &str {
        self.identity.service()
    }

    /// Snapshot of the current sink.
    pub fn sink(&self) -> Arc<dyn Sink> {
        let guard = self.sink.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the sink. Holders of the previous sink may keep using it.
    pub fn set_sink(&self, sink: Arc<dyn Sink>) {
        let mut guard = self.sink.write().unwrap_or_else(PoisonError::into_inner);
        *guard = sink;
    }

    /// Cached effective level.
    pub fn level(&self) -> LogLevel {
        LogLevel::from(self.level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// True if a record at `level` would pass the cached threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    pub fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.sink().log(level, args);
    }

    pub fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    pub fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    pub fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    pub fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Write a PANIC record. The calling thread keeps running.
    pub fn panic(&self, args: Arguments<'_>) {
        self.log(LogLevel::Panic, args);
    }

    /// Write a FATAL record. The process keeps running.
    pub fn fatal(&self, args: Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    /// Write `message` with structured key/value fields.
    pub fn log_kv(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        if self.enabled(level) {
            self.sink().log_kv(level, message, fields);
        }
    }

    pub fn debug_kv(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log_kv(LogLevel::Debug, message, fields);
    }

    pub fn info_kv(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log_kv(LogLevel::Info, message, fields);
    }

    pub fn warn_kv(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log_kv(LogLevel::Warn, message, fields);
    }

    pub fn error_kv(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.log_kv(LogLevel::Error, message, fields);
    }

    /// Build the message with `message` only if `level` is enabled.
    pub fn log_dynamic<F>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> String,
    {
        if self.enabled(level) {
            let message = message();
            self.log(level, format_args!("{}", message));
        }
    }

    pub fn debug_dynamic<F>(&self, message: F)
    where
        F: FnOnce() -> String,
    {
        self.log_dynamic(LogLevel::Debug, message);
    }

    pub fn info_dynamic<F>(&self, message: F)
    where
        F: FnOnce() -> String,
    {
        self.log_dynamic(LogLevel::Info, message);
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("identity", &self.identity)
            .field("level", &self.level())
            .finish()
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:tt)*) => {
        $logger.panic(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $logger.fatal(format_args!($($arg)*))
    };
}
