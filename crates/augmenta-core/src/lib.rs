//! Augmenta Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every other crate:
//! - Identifiers (ObjectId)
//! - Tracked records (Entity, AuxData, Scene, VideoOutput)
//! - Decoded OSC messages with typed argument accessors
//! - Lifecycle events delivered to subscribers
//! - Error type for the wire, transport and configuration edges

pub mod id;
pub mod record;
pub mod message;
pub mod event;
pub mod error;

pub use id::*;
pub use record::*;
pub use message::*;
pub use event::*;
pub use error::*;
