//! Configuration controller.
//!
//! # States
//! - Unconfigured: no configuration installed; every class resolves to the
//!   hardcoded default module config
//! - Configured: a `LogConfig` is active
//!
//! # State Transitions
//! ```text
//! Unconfigured ──set_config / refresh_config──▶ Configured
//! Configured   ──set_config / refresh_config──▶ Configured (config replaced)
//! ```
//!
//! # Refresh Protocol
//! ```text
//! store new config (atomic swap)
//!     → lock level table, retune every tracked LevelHandle, unlock
//!     → snapshot registry
//!     → per handle: build new sink
//!           ok  → track its LevelHandle, swap sink (handle write lock only)
//!           err → keep previous sink, record failure
//!     → report summary or batch of failures
//! ```
//!
//! # Design Decisions
//! - The configuration is replaced whole, never edited in place
//! - The level table mutex is held only while retuning levels
//! - Refreshes are serialized with each other, not with log calls or lookups

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::config::schema::LogConfig;
use crate::error::{IdentityFailure, RefreshError};
use crate::handle::LoggerHandle;
use crate::identity::LoggerIdentity;
use crate::level::LevelHandle;
use crate::registry::LoggerRegistry;
use crate::resolver::{resolve, resolve_level};
use crate::sink::SinkFactory;

/// Whether an explicit configuration is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Unconfigured,
    Configured,
}

/// Outcome of a refresh where every sink was rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Tracked level handles retuned in place.
    pub levels_applied: usize,
    /// Logger handles whose sink was swapped.
    pub sinks_rebuilt: usize,
}

/// Normalized module name → identity → live level handle.
type LevelTable = HashMap<String, HashMap<LoggerIdentity, LevelHandle>>;

/// Owns the active configuration and every logger built from it.
pub struct ConfigController {
    current: ArcSwapOption<LogConfig>,
    unconfigured: Arc<LogConfig>,
    levels: Mutex<LevelTable>,
    refresh_lock: Mutex<()>,
    registry: LoggerRegistry,
    factory: Arc<dyn SinkFactory>,
}

impl ConfigController {
    /// Create an unconfigured controller.
    pub fn new(factory: Arc<dyn SinkFactory>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            unconfigured: Arc::new(LogConfig::default()),
            levels: Mutex::new(HashMap::new()),
            refresh_lock: Mutex::new(()),
            registry: LoggerRegistry::new(),
            factory,
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.current.load().is_some() {
            ControllerState::Configured
        } else {
            ControllerState::Unconfigured
        }
    }

    pub fn is_configured(&self) -> bool {
        self.state() == ControllerState::Configured
    }

    /// The active configuration, or the empty one while unconfigured.
    pub fn current(&self) -> Arc<LogConfig> {
        self.current
            .load_full()
            .unwrap_or_else(|| Arc::clone(&self.unconfigured))
    }

    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    pub fn logger_count(&self) -> usize {
        self.registry.len()
    }

    /// Identities of every logger handed out so far, in no particular order.
    pub fn identities(&self) -> Vec<LoggerIdentity> {
        self.registry
            .snapshot()
            .iter()
            .map(|h| h.identity().clone())
            .collect()
    }

    /// Logger for `module`'s default channel.
    pub fn get_logger(&self, module: &str) -> Arc<LoggerHandle> {
        self.get_logger_by_service(module, "")
    }

    /// Logger for one service channel of `module`.
    ///
    /// The same `(module, service)` always yields the same handle, and that
    /// handle follows every later configuration change.
    pub fn get_logger_by_service(&self, module: &str, service: &str) -> Arc<LoggerHandle> {
        self.registry
            .get_or_create(LoggerIdentity::new(module, service), |id| self.create_handle(id))
    }

    /// Install the startup configuration and apply it to existing loggers.
    pub fn set_config(&self, config: LogConfig) -> Result<RefreshSummary, RefreshError> {
        if !self.is_configured() {
            tracing::info!(
                config_file = %config.config_file,
                "Logging configuration installed"
            );
        }
        self.refresh_config(config)
    }

    /// Replace the configuration and retune every logger handed out so far.
    ///
    /// A sink that fails to rebuild leaves that logger on its previous sink;
    /// the failures are returned together once every other logger is done.
    pub fn refresh_config(&self, config: LogConfig) -> Result<RefreshSummary, RefreshError> {
        let _serial = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let config = Arc::new(config.normalized());
        self.current.store(Some(Arc::clone(&config)));
        self.apply(&config)
    }

    /// Re-run the refresh against the active configuration.
    pub fn reapply(&self) -> Result<RefreshSummary, RefreshError> {
        let _serial = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let config = self.current();
        self.apply(&config)
    }

    fn apply(&self, config: &LogConfig) -> Result<RefreshSummary, RefreshError> {
        let levels_applied = self.apply_levels(config);
        let (sinks_rebuilt, failures) = self.rebuild_sinks(config);

        tracing::info!(
            levels_applied,
            sinks_rebuilt,
            failed = failures.len(),
            "Logging configuration applied"
        );

        if failures.is_empty() {
            Ok(RefreshSummary {
                levels_applied,
                sinks_rebuilt,
            })
        } else {
            Err(RefreshError {
                levels_applied,
                sinks_rebuilt,
                failures,
            })
        }
    }

    fn apply_levels(&self, config: &LogConfig) -> usize {
        let levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);
        let mut applied = 0;
        for handles in levels.values() {
            for (identity, handle) in handles {
                handle.set_level(resolve_level(identity, config));
                applied += 1;
            }
        }
        applied
    }

    fn rebuild_sinks(&self, config: &LogConfig) -> (usize, Vec<IdentityFailure>) {
        let mut rebuilt = 0;
        let mut failures = Vec::new();

        self.registry.range_all(|handle| {
            let identity = handle.identity();
            let resolved = resolve(identity, config);
            match self.factory.build(identity, &resolved) {
                Ok((sink, level)) => {
                    self.track(identity, level);
                    handle.set_sink(sink);
                    rebuilt += 1;
                }
                Err(source) => {
                    tracing::warn!(
                        identity = %identity,
                        error = %source,
                        "Failed to rebuild log sink, keeping previous sink"
                    );
                    failures.push(IdentityFailure {
                        identity: identity.clone(),
                        source,
                    });
                }
            }
            handle.set_level(resolved.level);
        });

        (rebuilt, failures)
    }

    fn create_handle(&self, identity: &LoggerIdentity) -> LoggerHandle {
        let config = self.current();
        let resolved = resolve(identity, &config);
        let (sink, level) = match self.factory.build(identity, &resolved) {
            Ok(built) => built,
            Err(error) => {
                tracing::warn!(
                    identity = %identity,
                    error = %error,
                    "Failed to build log sink, using fallback"
                );
                self.factory.fallback(identity, &resolved)
            }
        };
        self.track(identity, level);
        tracing::debug!(identity = %identity, level = %resolved.level, "Logger created");
        LoggerHandle::new(identity.clone(), sink, resolved.level)
    }

    fn track(&self, identity: &LoggerIdentity, level: LevelHandle) {
        let mut levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);
        levels
            .entry(identity.normalized_module())
            .or_default()
            .insert(identity.clone(), level);
    }
}

impl std::fmt::Debug for ConfigController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigController")
            .field("state", &self.state())
            .field("loggers", &self.registry.len())
            .finish()
    }
}
