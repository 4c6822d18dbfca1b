//! Error types for the Augmenta receiver
//!
//! Ingestion itself never fails. These errors come from the edges: packet
//! decoding, socket handling and configuration.

use thiserror::Error;

/// Core Augmenta errors
#[derive(Error, Debug)]
pub enum AugmentaError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown type tag: {0:?}")]
    UnknownTypeTag(char),

    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Receiver already connected")]
    AlreadyConnected,

    #[error("Receiver not connected")]
    NotConnected,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown protocol version: {0:?}")]
    UnknownProtocolVersion(String),
}

/// Result type for Augmenta operations
pub type AugmentaResult<T> = Result<T, AugmentaError>;
