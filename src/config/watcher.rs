//! Configuration file watcher for hot reload.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::LogConfig;
use crate::controller::ConfigController;

/// A watcher that monitors the logging configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LogConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Log config change detected, reloading");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload log config: {}. Keeping current config.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Log config watcher started");
        Ok(watcher)
    }
}

/// Apply every received configuration to `controller` until the channel closes.
///
/// Refreshes open log files, so each one runs on the blocking pool.
/// Returns the number of configurations applied.
pub async fn forward_updates<C>(
    controller: C,
    mut updates: mpsc::UnboundedReceiver<LogConfig>,
) -> usize
where
    C: Deref<Target = ConfigController> + Clone + Send + 'static,
{
    let mut applied = 0;
    while let Some(config) = updates.recv().await {
        applied += 1;
        let target = controller.clone();
        match tokio::task::spawn_blocking(move || target.refresh_config(config)).await {
            Ok(Ok(summary)) => tracing::info!(
                levels_applied = summary.levels_applied,
                sinks_rebuilt = summary.sinks_rebuilt,
                "Log config reloaded"
            ),
            Ok(Err(e)) => {
                for failure in &e.failures {
                    tracing::error!(
                        identity = %failure.identity,
                        error = %failure.source,
                        "Log sink not reloaded"
                    );
                }
                tracing::warn!("{}", e);
            }
            Err(e) => tracing::error!("Log config reload task failed: {}", e),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkConstructionError;
    use crate::identity::LoggerIdentity;
    use crate::level::LogLevel;
    use crate::resolver::ResolvedConfig;
    use crate::sink::{BuiltSink, DiscardSink, Sink, SinkFactory};
    use std::sync::Arc;

    struct Discarding;

    impl SinkFactory for Discarding {
        fn build(
            &self,
            _: &LoggerIdentity,
            config: &ResolvedConfig,
        ) -> Result<BuiltSink, SinkConstructionError> {
            let sink = DiscardSink::new(config.level);
            let level = sink.level_handle().clone();
            Ok((Arc::new(sink), level))
        }
    }

    fn config_text(default: &str) -> String {
        format!("[log.system]\nlog_level_default = \"{default}\"\nfile_path = \"./system.log\"\n")
    }

    fn config(default: &str) -> LogConfig {
        let mut config = LogConfig::default();
        config.log.system.log_level_default = default.into();
        config.log.system.file_path = "./system.log".into();
        config
    }

    #[tokio::test]
    async fn test_forward_updates_applies_in_order() {
        let controller = Arc::new(ConfigController::new(Arc::new(Discarding)));
        let logger = controller.get_logger("[Auth]");
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(config("WARN")).unwrap();
        tx.send(config("ERROR")).unwrap();
        drop(tx);

        let applied = forward_updates(Arc::clone(&controller), rx).await;
        assert_eq!(applied, 2);
        assert!(controller.is_configured());
        assert_eq!(logger.level(), LogLevel::Error);
    }

    #[tokio::test]
    async fn test_truncated_save_is_not_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.toml");
        std::fs::write(&path, config_text("INFO")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        std::fs::write(&path, "").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::write(&path, config_text("ERROR")).unwrap();

        let mut last = None;
        while let Ok(Some(config)) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            assert!(config.log.system.is_configured(), "unconfigured reload delivered");
            let done = config.log.system.log_level_default == "ERROR";
            last = Some(config);
            if done {
                break;
            }
        }
        let last = last.expect("no reload delivered");
        assert_eq!(last.log.system.log_level_default, "ERROR");
    }

    #[test]
    fn test_watcher_fails_on_missing_file() {
        let (watcher, _rx) = ConfigWatcher::new(Path::new("/nonexistent/modlog.toml"));
        assert!(watcher.run().is_err());
    }
}
