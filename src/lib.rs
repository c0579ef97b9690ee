//! Per-module loggers with live, layered configuration.
//!
//! # Architecture Overview
//!
//! ```text
//!   module code ──get_logger──▶ LoggerRegistry ──hit──▶ LoggerHandle
//!                                     │ miss
//!                                     ▼
//!               resolver (override → class default → global default)
//!                                     │
//!                                     ▼
//!                     SinkFactory::build → (Sink, LevelHandle)
//!
//!   operator ──set_config / refresh_config──▶ ConfigController
//!                                   ├─ retune tracked LevelHandles in place
//!                                   └─ rebuild and swap every handle's sink
//! ```
//!
//! Handles obtained once stay valid for the life of the process and follow
//! every later configuration change.

pub mod config;
pub mod controller;
pub mod error;
pub mod global;
pub mod handle;
pub mod identity;
pub mod level;
pub mod observability;
pub mod registry;
pub mod resolver;
pub mod sink;

pub use config::schema::LogConfig;
pub use controller::{ConfigController, ControllerState, RefreshSummary};
pub use error::{IdentityFailure, RefreshError, SinkConstructionError, UnknownLevel};
pub use global::{get_logger, get_logger_by_service, refresh_log_config, set_log_config};
pub use handle::LoggerHandle;
pub use identity::{
    LoggerIdentity, ModuleClass, MODULE_BRIEF, MODULE_EVENT, MODULE_REQUEST, MODULE_SYSTEM,
};
pub use level::{LevelHandle, LogLevel};
pub use registry::LoggerRegistry;
pub use resolver::ResolvedConfig;
pub use sink::{Sink, SinkFactory, TracingSinkFactory};
