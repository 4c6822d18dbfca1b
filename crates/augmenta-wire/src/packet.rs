//! OSC packets
//!
//! Packet = Message | Bundle
//! - Message: padded address, padded type tag string (`,` + tags), arguments
//! - Bundle: `#bundle\0`, 8-byte time tag, then size-prefixed elements
//!
//! A bundle element that fails to decode is skipped with a warning; its
//! siblings still decode. Array brackets in a type tag string are ignored
//! and the array's arguments are read in place.

use augmenta_core::{Address, AugmentaError, AugmentaResult, OscArg, OscMessage};
use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::primitives::{
    read_blob, read_f32, read_f64, read_i32, read_i64, read_string, read_u32, read_u64,
    write_blob, write_string,
};

/// Bundle marker
pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Largest UDP payload over IPv4
pub const MAX_PACKET_SIZE: usize = 65_507;

/// Maximum bundle nesting accepted by the decoder
pub const MAX_BUNDLE_DEPTH: usize = 8;

/// NTP-style time tag carried by bundles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeTag {
    pub seconds: u32,
    pub fraction: u32,
}

impl TimeTag {
    /// The special "immediately" tag
    pub const IMMEDIATELY: TimeTag = TimeTag {
        seconds: 0,
        fraction: 1,
    };
}

/// OSC bundle
#[derive(Clone, Debug, PartialEq)]
pub struct OscBundle {
    pub time_tag: TimeTag,
    pub content: Vec<OscPacket>,
}

/// OSC packet
#[derive(Clone, Debug, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    /// Parse a packet from a datagram
    pub fn decode(buf: &[u8]) -> AugmentaResult<Self> {
        decode_packet(buf, 0)
    }

    /// Serialize to a datagram
    pub fn encode(&self) -> AugmentaResult<Vec<u8>> {
        let mut out = BytesMut::new();
        encode_packet(self, &mut out)?;
        Ok(out.to_vec())
    }

    /// Flatten into messages, in packet order
    pub fn into_messages(self) -> Vec<OscMessage> {
        let mut messages = Vec::new();
        self.collect_messages(&mut messages);
        messages
    }

    fn collect_messages(self, out: &mut Vec<OscMessage>) {
        match self {
            OscPacket::Message(msg) => out.push(msg),
            OscPacket::Bundle(bundle) => {
                for element in bundle.content {
                    element.collect_messages(out);
                }
            }
        }
    }

    /// Number of messages, counting through nested bundles
    pub fn message_count(&self) -> usize {
        match self {
            OscPacket::Message(_) => 1,
            OscPacket::Bundle(bundle) => bundle.content.iter().map(OscPacket::message_count).sum(),
        }
    }
}

impl From<OscMessage> for OscPacket {
    fn from(msg: OscMessage) -> Self {
        OscPacket::Message(msg)
    }
}

fn decode_packet(buf: &[u8], depth: usize) -> AugmentaResult<OscPacket> {
    match buf.first() {
        Some(b'/') => decode_message(buf).map(OscPacket::Message),
        Some(b'#') if buf.starts_with(BUNDLE_TAG) => {
            decode_bundle(&buf[BUNDLE_TAG.len()..], depth).map(OscPacket::Bundle)
        }
        Some(_) => Err(AugmentaError::InvalidWireFormat(
            "Packet is neither a message nor a bundle".into(),
        )),
        None => Err(AugmentaError::BufferTooShort {
            expected: 4,
            actual: 0,
        }),
    }
}

fn decode_message(buf: &[u8]) -> AugmentaResult<OscMessage> {
    let mut cursor = buf;

    let path = read_string(&mut cursor)?;
    let address = Address::parse(&path)?;

    // Very old senders omit the type tag string entirely
    if cursor.is_empty() {
        return Ok(OscMessage::new(address, Vec::new()));
    }

    let tags = read_string(&mut cursor)?;
    let tags = tags.strip_prefix(',').ok_or_else(|| {
        AugmentaError::InvalidWireFormat("Type tag string must start with ','".into())
    })?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => OscArg::Int(read_i32(&mut cursor)?),
            'f' => OscArg::Float(read_f32(&mut cursor)?),
            's' | 'S' => OscArg::String(read_string(&mut cursor)?),
            'b' => OscArg::Blob(read_blob(&mut cursor)?),
            'h' => OscArg::Long(read_i64(&mut cursor)?),
            'd' => OscArg::Double(read_f64(&mut cursor)?),
            'T' => OscArg::Bool(true),
            'F' => OscArg::Bool(false),
            'N' => OscArg::Nil,
            'I' => OscArg::Impulse,
            'c' => {
                let code = read_u32(&mut cursor)?;
                OscArg::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            'r' => OscArg::Color(read_u32(&mut cursor)?),
            'm' => OscArg::Midi(read_u32(&mut cursor)?.to_be_bytes()),
            't' => OscArg::TimeTag(read_u64(&mut cursor)?),
            '[' | ']' => continue,
            other => return Err(AugmentaError::UnknownTypeTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage::new(address, args))
}

fn decode_bundle(buf: &[u8], depth: usize) -> AugmentaResult<OscBundle> {
    if depth >= MAX_BUNDLE_DEPTH {
        return Err(AugmentaError::InvalidWireFormat(format!(
            "Bundle nesting exceeds {}",
            MAX_BUNDLE_DEPTH
        )));
    }

    let mut cursor = buf;
    let time_tag = TimeTag {
        seconds: read_u32(&mut cursor)?,
        fraction: read_u32(&mut cursor)?,
    };

    let mut content = Vec::new();
    while !cursor.is_empty() {
        let size = read_i32(&mut cursor)?;
        if size < 0 || size as usize > cursor.len() {
            return Err(AugmentaError::InvalidWireFormat(format!(
                "Bundle element size {} exceeds remaining {}",
                size,
                cursor.len()
            )));
        }

        let (element, rest) = cursor.split_at(size as usize);
        match decode_packet(element, depth + 1) {
            Ok(packet) => content.push(packet),
            Err(e) => warn!(len = element.len(), "Skipping undecodable bundle element: {}", e),
        }
        cursor = rest;
    }

    Ok(OscBundle { time_tag, content })
}

fn encode_packet(packet: &OscPacket, out: &mut BytesMut) -> AugmentaResult<()> {
    match packet {
        OscPacket::Message(msg) => encode_message(msg, out),
        OscPacket::Bundle(bundle) => {
            out.put_slice(BUNDLE_TAG);
            out.put_u32(bundle.time_tag.seconds);
            out.put_u32(bundle.time_tag.fraction);

            for element in &bundle.content {
                let mut inner = BytesMut::new();
                encode_packet(element, &mut inner)?;
                let size = i32::try_from(inner.len()).map_err(|_| {
                    AugmentaError::InvalidWireFormat("Bundle element too large".into())
                })?;
                out.put_i32(size);
                out.put_slice(&inner);
            }
            Ok(())
        }
    }
}

fn encode_message(msg: &OscMessage, out: &mut BytesMut) -> AugmentaResult<()> {
    write_string(out, &msg.address.to_string())?;
    write_string(out, &format!(",{}", msg.type_tags()))?;

    for arg in &msg.args {
        match arg {
            OscArg::Int(v) => out.put_i32(*v),
            OscArg::Float(v) => out.put_f32(*v),
            OscArg::String(v) => write_string(out, v)?,
            OscArg::Blob(v) => write_blob(out, v)?,
            OscArg::Long(v) => out.put_i64(*v),
            OscArg::Double(v) => out.put_f64(*v),
            OscArg::Char(c) => out.put_u32(u32::from(*c)),
            OscArg::Color(v) => out.put_u32(*v),
            OscArg::Midi(v) => out.put_slice(v),
            OscArg::TimeTag(v) => out.put_u64(*v),
            OscArg::Bool(_) | OscArg::Nil | OscArg::Impulse => {}
        }
    }
    Ok(())
}
