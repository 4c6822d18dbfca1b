//! Decoded OSC messages
//!
//! A message is an address path plus an ordered list of typed arguments.
//! The accessors are strict: `get_int32` only reads an `i` argument and
//! `get_float` only reads an `f` argument. Anything else is reported as
//! absent so the caller can keep the previous field value.

use std::fmt;

use crate::{AugmentaError, AugmentaResult};

/// Typed OSC argument
#[derive(Clone, Debug, PartialEq)]
pub enum OscArg {
    /// `i` - 32-bit integer
    Int(i32),
    /// `f` - 32-bit float
    Float(f32),
    /// `s` - string
    String(String),
    /// `b` - blob
    Blob(Vec<u8>),
    /// `h` - 64-bit integer
    Long(i64),
    /// `d` - 64-bit float
    Double(f64),
    /// `T` / `F`
    Bool(bool),
    /// `N`
    Nil,
    /// `I`
    Impulse,
    /// `c` - character, sent as 32 bits
    Char(char),
    /// `r` - 32-bit RGBA color
    Color(u32),
    /// `m` - 4-byte MIDI message
    Midi([u8; 4]),
    /// `t` - 64-bit NTP time tag
    TimeTag(u64),
}

impl OscArg {
    /// OSC type tag character
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::Bool(true) => 'T',
            OscArg::Bool(false) => 'F',
            OscArg::Nil => 'N',
            OscArg::Impulse => 'I',
            OscArg::Char(_) => 'c',
            OscArg::Color(_) => 'r',
            OscArg::Midi(_) => 'm',
            OscArg::TimeTag(_) => 't',
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        OscArg::Int(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        OscArg::Float(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        OscArg::String(v.to_string())
    }
}

/// OSC address path, e.g. `/object/enter`
///
/// The last segment is the method; every segment before it is a container.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// Parse an address path. It must start with `/` and every segment
    /// must be non-empty.
    pub fn parse(path: &str) -> AugmentaResult<Self> {
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| AugmentaError::InvalidAddress(path.to_string()))?;

        let segments: Vec<String> = rest.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(AugmentaError::InvalidAddress(path.to_string()));
        }

        Ok(Address { segments })
    }

    /// All path segments, containers first and method last
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Container at `index`, if the path has that many containers
    pub fn container(&self, index: usize) -> Option<&str> {
        let containers = self.segments.len() - 1;
        if index < containers {
            Some(self.segments[index].as_str())
        } else {
            None
        }
    }

    /// Number of containers before the method
    pub fn container_count(&self) -> usize {
        self.segments.len() - 1
    }

    /// Final path segment
    pub fn method(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Decoded OSC message
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub address: Address,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: Address, args: Vec<OscArg>) -> Self {
        OscMessage { address, args }
    }

    /// Build a message from an address string
    pub fn with_path(path: &str, args: Vec<OscArg>) -> AugmentaResult<Self> {
        Ok(OscMessage {
            address: Address::parse(path)?,
            args,
        })
    }

    /// Read a 32-bit integer argument
    #[inline]
    pub fn get_int32(&self, index: usize) -> Option<i32> {
        match self.args.get(index) {
            Some(OscArg::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Read a 32-bit float argument
    #[inline]
    pub fn get_float(&self, index: usize) -> Option<f32> {
        match self.args.get(index) {
            Some(OscArg::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Type tag string without the leading comma
    pub fn type_tags(&self) -> String {
        self.args.iter().map(OscArg::type_tag).collect()
    }
}
