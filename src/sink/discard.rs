//! Sink that drops every record.

use std::fmt::Arguments;

use crate::level::{LevelHandle, LogLevel};
use crate::sink::Sink;

/// A sink that discards all records.
///
/// Installed when a real sink cannot be built, and handy in tests where log
/// output would be noise.
#[derive(Debug, Clone)]
pub struct DiscardSink {
    level: LevelHandle,
}

impl DiscardSink {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: LevelHandle::new(level),
        }
    }
}

impl Sink for DiscardSink {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}

    fn level_handle(&self) -> &LevelHandle {
        &self.level
    }
}
