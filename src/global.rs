//! Process-wide default controller.
//!
//! Modules that initialize independently can call `get_logger` without
//! wiring a controller through. The controller is created on first use with
//! a `TracingSinkFactory`; `install` replaces that choice if it runs first.

use std::sync::{Arc, OnceLock};

use crate::config::schema::LogConfig;
use crate::controller::{ConfigController, RefreshSummary};
use crate::error::RefreshError;
use crate::handle::LoggerHandle;
use crate::sink::{SinkFactory, TracingSinkFactory};

static CONTROLLER: OnceLock<ConfigController> = OnceLock::new();

/// Use `factory` for the process-wide controller.
///
/// Returns false if the controller already exists.
pub fn install(factory: Arc<dyn SinkFactory>) -> bool {
    let mut installed = false;
    CONTROLLER.get_or_init(|| {
        installed = true;
        ConfigController::new(factory)
    });
    installed
}

/// The process-wide controller.
pub fn controller() -> &'static ConfigController {
    CONTROLLER.get_or_init(|| ConfigController::new(Arc::new(TracingSinkFactory::new())))
}

/// Find or create the logger for `module`.
///
/// Usually called once while a module initializes; the handle stays valid
/// and follows configuration changes until the process exits.
pub fn get_logger(module: &str) -> Arc<LoggerHandle> {
    controller().get_logger(module)
}

/// Find or create the logger for one service channel of `module`.
pub fn get_logger_by_service(module: &str, service: &str) -> Arc<LoggerHandle> {
    controller().get_logger_by_service(module, service)
}

/// Install the startup configuration.
pub fn set_log_config(config: LogConfig) -> Result<RefreshSummary, RefreshError> {
    controller().set_config(config)
}

/// Replace the configuration at runtime.
pub fn refresh_log_config(config: LogConfig) -> Result<RefreshSummary, RefreshError> {
    controller().refresh_config(config)
}
