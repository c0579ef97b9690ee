//! Operator CLI for the module logging facility.
//!
//! - `modlog resolve` prints how modules resolve under a configuration
//! - `modlog watch` emits heartbeats from module loggers while hot-reloading
//!   the configuration file, so verbosity changes can be observed live

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use modlog::config::watcher::{forward_updates, ConfigWatcher};
use modlog::config::{load_config, LogConfig};
use modlog::observability::logging::{init_tracing, DEFAULT_DIRECTIVE};
use modlog::resolver::resolve;
use modlog::{global, LogLevel, LoggerIdentity};

const HEARTBEAT_LEVELS: [LogLevel; 4] =
    [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];

#[derive(Parser)]
#[command(name = "modlog")]
#[command(about = "Inspect and exercise per-module log configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print each module's resolved configuration as JSON
    Resolve {
        /// TOML configuration file (hardcoded defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Service channel to resolve the modules under
        #[arg(short, long, default_value = "")]
        service: String,

        /// Module keys, e.g. "[Auth]" or "[Request]"
        #[arg(required = true)]
        modules: Vec<String>,
    },
    /// Log heartbeats from module loggers, reloading the config on change
    Watch {
        /// TOML configuration file to load and watch
        #[arg(short, long)]
        config: PathBuf,

        /// Module keys to emit heartbeats from
        #[arg(
            short,
            long = "module",
            default_values_t = vec!["[System]".to_string(), "[Request]".to_string()]
        )]
        modules: Vec<String>,

        /// Milliseconds between heartbeats
        #[arg(short, long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(DEFAULT_DIRECTIVE) {
        eprintln!("diagnostic logging unavailable: {e}");
    }

    match cli.command {
        Commands::Resolve {
            config,
            service,
            modules,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => LogConfig::default(),
            }
            .normalized();

            let resolved: Vec<_> = modules
                .iter()
                .map(|module| {
                    resolve(&LoggerIdentity::new(module.as_str(), service.as_str()), &config)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Commands::Watch {
            config,
            modules,
            interval_ms,
        } => {
            let controller = global::controller();
            if let Err(e) = controller.set_config(load_config(&config)?) {
                tracing::warn!("{}", e);
            }

            let loggers: Vec<_> = modules.iter().map(|m| global::get_logger(m)).collect();

            let (watcher, updates) = ConfigWatcher::new(&config);
            let _watcher = watcher.run()?;
            let reload = tokio::spawn(forward_updates(controller, updates));

            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            let mut beat: u64 = 0;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        beat += 1;
                        for logger in &loggers {
                            for level in HEARTBEAT_LEVELS {
                                logger.log(level, format_args!("heartbeat {} at {}", beat, level));
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!(beats = beat, "Shutting down");
                        break;
                    }
                }
            }
            reload.abort();
        }
    }

    Ok(())
}
