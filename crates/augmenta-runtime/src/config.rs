//! Receiver configuration

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use augmenta_core::{AugmentaError, AugmentaResult};
use augmenta_state::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// Default Augmenta output port
pub const DEFAULT_PORT: u16 = 12000;

/// Receiver configuration
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Local address to bind
    pub bind_address: String,
    /// UDP port; 0 picks an ephemeral port
    pub port: u16,
    /// Schema version, fixed for the life of the session
    pub protocol: ProtocolVersion,
    /// Datagrams buffered between the socket and the session
    pub channel_capacity: usize,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
    pub json_logs: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            protocol: ProtocolVersion::V2,
            channel_capacity: 1024,
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ReceiverConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> AugmentaResult<Self> {
        let config: ReceiverConfig = serde_json::from_str(json)
            .map_err(|e| AugmentaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> AugmentaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AugmentaError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        ReceiverConfig::from_json(&json)
    }

    pub fn validate(&self) -> AugmentaResult<()> {
        if self.channel_capacity == 0 {
            return Err(AugmentaError::InvalidConfig(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        self.bind_ip()?;
        Ok(())
    }

    /// Address the receiver binds to
    pub fn socket_addr(&self) -> AugmentaResult<SocketAddr> {
        Ok(SocketAddr::new(self.bind_ip()?, self.port))
    }

    fn bind_ip(&self) -> AugmentaResult<IpAddr> {
        self.bind_address.parse().map_err(|_| {
            AugmentaError::InvalidConfig(format!("invalid bind_address: {:?}", self.bind_address))
        })
    }
}
