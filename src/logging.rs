use crate::error::{Result, StudyAssistantError};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Installs the process-wide log subscriber.
///
/// `RUST_LOG` wins when it is set; otherwise `default_level` applies. Records
/// emitted through the `log` macros are forwarded to the same output.
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| StudyAssistantError::Internal(format!("logging already initialized: {}", e)))
}
