//! Augmenta Wire - OSC 1.0 packet format
//!
//! This crate implements the OSC encoding the tracking producer speaks:
//! - Padded strings and blobs (4-byte alignment, big endian)
//! - Messages (address + type tags + arguments)
//! - Bundles (time tag + nested elements), flattened in packet order

mod primitives;
pub mod packet;

pub use packet::*;
