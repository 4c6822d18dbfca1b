//! Augmenta Runtime - Receiver and process plumbing
//!
//! This crate provides:
//! - `ReceiverConfig`, loaded from JSON
//! - Logging setup on top of `tracing-subscriber`
//! - `AugmentaReceiver`, which binds the socket, runs the receive loop and
//!   feeds the tracking session

pub mod config;
pub mod logging;
pub mod receiver;

pub use config::*;
pub use logging::*;
pub use receiver::*;
