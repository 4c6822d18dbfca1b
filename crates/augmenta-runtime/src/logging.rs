//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured filter applies.

use augmenta_core::{AugmentaError, AugmentaResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ReceiverConfig;

fn env_filter(fallback: &str) -> AugmentaResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback).map_err(|e| {
            AugmentaError::InvalidConfig(format!("invalid log filter {:?}: {}", fallback, e))
        }),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(filter: &str, json: bool) -> AugmentaResult<()> {
    let filter = env_filter(filter)?;
    let json_layer = json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| AugmentaError::InvalidConfig(format!("logging already initialized: {}", e)))
}

/// [`init_logging`] with the filter and format from a config
pub fn init_logging_from_config(config: &ReceiverConfig) -> AugmentaResult<()> {
    init_logging(&config.log_filter, config.json_logs)
}
