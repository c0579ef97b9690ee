//! Sink boundary.
//!
//! A sink is whatever actually writes a log record. The core never formats,
//! writes or rotates anything itself; it asks a `SinkFactory` for a sink per
//! logger identity and swaps that sink when the configuration changes.
//!
//! # Data Flow
//! ```text
//! ResolvedConfig → SinkFactory::build → (Arc<dyn Sink>, LevelHandle)
//!                                          │              │
//!                         stored in LoggerHandle    tracked by ConfigController
//! ```
//!
//! # Design Decisions
//! - Every `build` returns an independent sink; older sinks stay usable by
//!   anyone still holding them until the last `Arc` is dropped
//! - `fallback` is infallible so obtaining a logger never fails

mod discard;
mod tracing_sink;

use std::fmt::{self, Arguments};
use std::sync::Arc;

pub use discard::DiscardSink;
pub use tracing_sink::{TracingSink, TracingSinkFactory};

use crate::error::SinkConstructionError;
use crate::identity::LoggerIdentity;
use crate::level::{LevelHandle, LogLevel};
use crate::resolver::ResolvedConfig;

/// A built sink plus the live handle on its threshold.
pub type BuiltSink = (Arc<dyn Sink>, LevelHandle);

/// Destination for log records.
pub trait Sink: Send + Sync {
    /// Write one record. Records below the sink's threshold are dropped.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    /// The threshold this sink filters with.
    fn level_handle(&self) -> &LevelHandle;

    /// Write one record carrying key/value fields.
    ///
    /// Sinks without structured output append the fields to the message as
    /// `key=value` pairs.
    fn log_kv(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        if fields.is_empty() {
            self.log(level, format_args!("{}", message));
        } else {
            self.log(level, format_args!("{} {}", message, KeyValues(fields)));
        }
    }
}

/// Space-separated `key=value` rendering of structured fields.
pub struct KeyValues<'a>(pub &'a [(&'a str, &'a dyn fmt::Display)]);

impl fmt::Display for KeyValues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Builds sinks from resolved per-identity configuration.
pub trait SinkFactory: Send + Sync {
    /// Build a fresh sink. May be called many times for the same identity.
    fn build(
        &self,
        identity: &LoggerIdentity,
        config: &ResolvedConfig,
    ) -> Result<BuiltSink, SinkConstructionError>;

    /// Sink installed when the first `build` for an identity fails.
    fn fallback(&self, _identity: &LoggerIdentity, config: &ResolvedConfig) -> BuiltSink {
        let sink = DiscardSink::new(config.level);
        let level = sink.level_handle().clone();
        (Arc::new(sink), level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_display() {
        let height = 42;
        let fields: [(&str, &dyn fmt::Display); 2] = [("height", &height), ("peer", &"p1")];
        assert_eq!(KeyValues(&fields).to_string(), "height=42 peer=p1");
        assert_eq!(KeyValues(&[]).to_string(), "");
    }
}
