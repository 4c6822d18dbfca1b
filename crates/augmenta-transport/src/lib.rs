//! Augmenta Transport - UDP delivery of OSC packets
//!
//! This crate provides:
//! - A bound UDP socket that sends and receives whole OSC packets
//! - A background receive loop feeding datagrams into a channel

pub mod udp;

pub use udp::*;
