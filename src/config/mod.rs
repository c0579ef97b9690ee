//! Logging configuration.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, level lint)
//!     → LogConfig (immutable)
//!     → ConfigController::set_config at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → channel → forward_updates
//!     → ConfigController::refresh_config
//!     → every logger retuned in place
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full replacement
//! - All fields have defaults to allow minimal configs
//! - A config that fails to load leaves the active one untouched

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{LogConfig, LogModuleConfig, LoggerIns};
