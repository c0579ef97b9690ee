//! Diagnostics for the logging facility itself.
//!
//! # Data Flow
//! ```text
//! ConfigController, loader, watcher
//!     → tracing macros (structured fields)
//!     → global subscriber installed by logging.rs
//!
//! Module loggers
//!     → their own sinks (never the global subscriber)
//! ```

pub mod logging;
