//! Shared utilities for integration tests.

use std::collections::HashSet;
use std::fmt::Arguments;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use modlog::identity::normalize_module;
use modlog::resolver::ResolvedConfig;
use modlog::sink::BuiltSink;
use modlog::{
    LevelHandle, LogConfig, LogLevel, LoggerIdentity, Sink, SinkConstructionError, SinkFactory,
};

/// One record captured by a `RecordingSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identity: LoggerIdentity,
    /// Which build of the identity's sink wrote the record (1 = first).
    pub generation: usize,
    pub level: LogLevel,
    pub message: String,
}

/// Sink that appends to a log shared with its factory.
pub struct RecordingSink {
    identity: LoggerIdentity,
    generation: usize,
    level: LevelHandle,
    records: Arc<Mutex<Vec<Record>>>,
}

impl Sink for RecordingSink {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if self.level.enabled(level) {
            self.records.lock().unwrap().push(Record {
                identity: self.identity.clone(),
                generation: self.generation,
                level,
                message: args.to_string(),
            });
        }
    }

    fn level_handle(&self) -> &LevelHandle {
        &self.level
    }
}

/// Factory that counts builds, records output and can be told to fail.
#[derive(Default)]
pub struct RecordingFactory {
    builds: AtomicUsize,
    generations: Mutex<Vec<(LoggerIdentity, usize)>>,
    failing_modules: Mutex<HashSet<String>>,
    records: Arc<Mutex<Vec<Record>>>,
    last_config: Mutex<Vec<ResolvedConfig>>,
}

#[allow(dead_code)]
impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total successful builds.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Make every later build for `module` fail.
    pub fn fail_for(&self, module: &str) {
        self.failing_modules.lock().unwrap().insert(normalize_module(module));
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn records_for(&self, module: &str) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.identity.module() == module)
            .collect()
    }

    /// Resolved configs passed to successful builds, oldest first.
    pub fn resolved(&self) -> Vec<ResolvedConfig> {
        self.last_config.lock().unwrap().clone()
    }

    fn next_generation(&self, identity: &LoggerIdentity) -> usize {
        let mut generations = self.generations.lock().unwrap();
        match generations.iter_mut().find(|(id, _)| id == identity) {
            Some((_, generation)) => {
                *generation += 1;
                *generation
            }
            None => {
                generations.push((identity.clone(), 1));
                1
            }
        }
    }
}

impl SinkFactory for RecordingFactory {
    fn build(
        &self,
        identity: &LoggerIdentity,
        config: &ResolvedConfig,
    ) -> Result<BuiltSink, SinkConstructionError> {
        if self
            .failing_modules
            .lock()
            .unwrap()
            .contains(&identity.normalized_module())
        {
            return Err(SinkConstructionError::Rejected(format!("{} is broken", identity)));
        }

        self.builds.fetch_add(1, Ordering::SeqCst);
        self.last_config.lock().unwrap().push(config.clone());
        let sink = RecordingSink {
            identity: identity.clone(),
            generation: self.next_generation(identity),
            level: LevelHandle::new(config.level),
            records: Arc::clone(&self.records),
        };
        let level = sink.level.clone();
        Ok((Arc::new(sink), level))
    }
}

/// A configuration with a system default and overrides.
#[allow(dead_code)]
pub fn system_config(default: &str, overrides: &[(&str, &str)]) -> LogConfig {
    let mut config = LogConfig::default();
    config.log.system.log_level_default = default.to_string();
    config.log.system.file_path = "./logs/system.log".to_string();
    for (module, level) in overrides {
        config
            .log
            .system
            .log_levels
            .insert(module.to_string(), level.to_string());
    }
    config
}
