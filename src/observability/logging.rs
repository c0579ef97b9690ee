//! Global diagnostic subscriber.
//!
//! # Responsibilities
//! - Install the process-wide subscriber that receives the crate's own events
//! - Honor `RUST_LOG`, falling back to a caller-supplied directive
//!
//! # Design Decisions
//! - Uses `try_init` so a host that already installed a subscriber gets an
//!   error back instead of a panic

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "modlog=info";

/// Install the global diagnostic subscriber.
pub fn init_tracing(default_directive: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
