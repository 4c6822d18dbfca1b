//! Augmenta State - Live scene model
//!
//! This crate turns decoded OSC messages into a queryable scene:
//! - Per-version schema tables (address -> field recipe)
//! - Soft-fail field extraction
//! - Address routing
//! - Keyed live tables for objects and their auxiliary data
//! - Single-record holders for the scene and the video output
//! - Synchronous, ordered event delivery
//! - The tracking session tying it all together

pub mod extract;
pub mod schema;
pub mod router;
pub mod store;
pub mod holder;
pub mod bus;
pub mod session;

pub use extract::*;
pub use schema::*;
pub use router::*;
pub use store::*;
pub use holder::*;
pub use bus::*;
pub use session::*;
