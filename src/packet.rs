//! # MQTT Packet Structures and Serialization
//!
//! This module defines the MQTT 3.1 (`MQIsdp`) packets the client sends and the
//! acknowledgments it checks. Encoding is pure: every packet is written into a
//! caller-provided buffer and nothing here touches the modem.
//!
//! Inbound packets are not decoded in general. The broker's reply to a send is
//! checked against the fixed header bytes of the expected acknowledgment with
//! [`validate_ack`].

use crate::error::{ConnectReturnCode, EncodeError};
use crate::util::{encode_remaining_length, encode_string, encoded_string_len};

/// Protocol name sent in `CONNECT`.
pub const PROTOCOL_NAME: &[u8] = b"MQIsdp";

/// Protocol level for `MQIsdp`.
pub const PROTOCOL_VERSION: u8 = 3;

const DUP_FLAG: u8 = 0x08;
const RETAIN_FLAG: u8 = 0x01;

const USER_NAME_FLAG: u8 = 0x80;
const PASSWORD_FLAG: u8 = 0x40;
const WILL_RETAIN_FLAG: u8 = 0x20;
const WILL_FLAG: u8 = 0x04;
const CLEAN_SESSION_FLAG: u8 = 0x02;

/// MQTT control packet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
}

impl PacketType {
    /// The fixed header byte of this type with all flag bits cleared.
    pub const fn header(self) -> u8 {
        (self as u8) << 4
    }
}

/// Represents the Quality of Service (QoS) levels for MQTT messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// A trait for packets that can be encoded into a byte buffer.
pub trait EncodePacket {
    /// Writes the packet into `buf`, returning the number of bytes used.
    fn encode(&self, buf: &mut [u8]) -> Result<usize, EncodeError>;
}

/// The outbound packets this client produces.
#[derive(Debug, Clone, Copy)]
pub enum MqttPacket<'a> {
    Connect(Connect<'a>),
    Publish(Publish<'a>),
    PingReq,
    Disconnect,
}

impl EncodePacket for MqttPacket<'_> {
    fn encode(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        match self {
            MqttPacket::Connect(connect) => connect.encode(buf),
            MqttPacket::Publish(publish) => publish.encode(buf),
            MqttPacket::PingReq => write_fixed(buf, &encode_ping()),
            MqttPacket::Disconnect => write_fixed(buf, &encode_disconnect()),
        }
    }
}

/// Forward-only writer over an output buffer.
struct Cursor<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> Cursor<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        *self.buf.get_mut(self.pos).ok_or(EncodeError::BufferTooSmall)? = byte;
        self.pos += 1;
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.buf
            .get_mut(self.pos..self.pos + bytes.len())
            .ok_or(EncodeError::BufferTooSmall)?
            .copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    fn put_string(&mut self, s: &[u8]) -> Result<(), EncodeError> {
        self.pos += encode_string(&mut self.buf[self.pos..], s)?;
        Ok(())
    }

    fn put_remaining_length(&mut self, len: usize) -> Result<(), EncodeError> {
        let len = u32::try_from(len).map_err(|_| EncodeError::TooLong)?;
        self.put_slice(&encode_remaining_length(len)?)
    }
}

fn write_fixed(buf: &mut [u8], bytes: &[u8]) -> Result<usize, EncodeError> {
    let mut cursor = Cursor::new(buf);
    cursor.put_slice(bytes)?;
    Ok(cursor.pos)
}

// --- CONNECT Packet ---

/// Last-will message registered with the broker on `CONNECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Will<'a> {
    pub topic: &'a str,
    pub message: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connect<'a> {
    pub protocol_version: u8,
    pub keep_alive: u16,
    pub client_id: &'a str,
    pub clean_session: bool,
    pub username: Option<&'a str>,
    /// Only sent together with a username.
    pub password: Option<&'a [u8]>,
    pub will: Option<Will<'a>>,
}

impl<'a> Connect<'a> {
    pub fn new(client_id: &'a str, keep_alive: u16, clean_session: bool) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            keep_alive,
            client_id,
            clean_session,
            username: None,
            password: None,
            will: None,
        }
    }

    fn password_field(&self) -> Option<&'a [u8]> {
        self.username.and(self.password)
    }

    /// The connect-flags byte.
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.username.is_some() {
            flags |= USER_NAME_FLAG;
        }
        if self.password_field().is_some() {
            flags |= PASSWORD_FLAG;
        }
        if let Some(will) = &self.will {
            flags |= WILL_FLAG | ((will.qos as u8) << 3);
            if will.retain {
                flags |= WILL_RETAIN_FLAG;
            }
        }
        if self.clean_session {
            flags |= CLEAN_SESSION_FLAG;
        }
        flags
    }

    fn remaining_length(&self) -> usize {
        // name, level, flags, keep-alive
        let mut len = encoded_string_len(PROTOCOL_NAME) + 1 + 1 + 2;
        len += encoded_string_len(self.client_id.as_bytes());
        if let Some(will) = &self.will {
            len += encoded_string_len(will.topic.as_bytes());
            len += encoded_string_len(will.message);
        }
        if let Some(username) = self.username {
            len += encoded_string_len(username.as_bytes());
        }
        if let Some(password) = self.password_field() {
            len += encoded_string_len(password);
        }
        len
    }
}

impl EncodePacket for Connect<'_> {
    fn encode(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut cursor = Cursor::new(buf);
        cursor.put_u8(PacketType::Connect.header())?;
        cursor.put_remaining_length(self.remaining_length())?;

        // Variable header
        cursor.put_string(PROTOCOL_NAME)?;
        cursor.put_u8(self.protocol_version)?;
        cursor.put_u8(self.flags())?;
        cursor.put_slice(&self.keep_alive.to_be_bytes())?;

        // Payload, in the order the flags announce it
        cursor.put_string(self.client_id.as_bytes())?;
        if let Some(will) = &self.will {
            cursor.put_string(will.topic.as_bytes())?;
            cursor.put_string(will.message)?;
        }
        if let Some(username) = self.username {
            cursor.put_string(username.as_bytes())?;
        }
        if let Some(password) = self.password_field() {
            cursor.put_string(password)?;
        }
        Ok(cursor.pos)
    }
}

// --- PUBLISH Packet ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    /// Only sent when `qos` is above `AtMostOnce`.
    pub packet_id: u16,
    pub topic: &'a str,
    pub payload: &'a [u8],
}

impl<'a> Publish<'a> {
    pub fn new(topic: &'a str, payload: &'a [u8], qos: QoS, packet_id: u16) -> Self {
        Self {
            dup: false,
            qos,
            retain: false,
            packet_id,
            topic,
            payload,
        }
    }

    /// The fixed header byte carrying type, DUP, QoS and RETAIN.
    pub fn header(&self) -> u8 {
        let mut header = PacketType::Publish.header() | ((self.qos as u8) << 1);
        if self.dup {
            header |= DUP_FLAG;
        }
        if self.retain {
            header |= RETAIN_FLAG;
        }
        header
    }

    fn has_packet_id(&self) -> bool {
        self.qos != QoS::AtMostOnce
    }
}

impl EncodePacket for Publish<'_> {
    fn encode(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut remaining = encoded_string_len(self.topic.as_bytes()) + self.payload.len();
        if self.has_packet_id() {
            remaining += 2;
        }

        let mut cursor = Cursor::new(buf);
        cursor.put_u8(self.header())?;
        cursor.put_remaining_length(remaining)?;
        cursor.put_string(self.topic.as_bytes())?;
        if self.has_packet_id() {
            cursor.put_slice(&self.packet_id.to_be_bytes())?;
        }
        // The message is not length-prefixed; it fills the rest of the packet.
        cursor.put_slice(self.payload)?;
        Ok(cursor.pos)
    }
}

// --- PINGREQ / DISCONNECT Packets ---

/// `PINGREQ`: fixed header only.
pub const fn encode_ping() -> [u8; 2] {
    [PacketType::PingReq.header(), 0x00]
}

/// `DISCONNECT`: fixed header only.
pub const fn encode_disconnect() -> [u8; 2] {
    [PacketType::Disconnect.header(), 0x00]
}

// --- Acknowledgments ---

/// Acknowledgments the client waits for after a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    ConnAck,
    PubAck,
    PingResp,
}

impl Ack {
    pub fn packet_type(self) -> PacketType {
        match self {
            Ack::ConnAck => PacketType::ConnAck,
            Ack::PubAck => PacketType::PubAck,
            Ack::PingResp => PacketType::PingResp,
        }
    }

    /// The second byte of a well-formed acknowledgment, its remaining length.
    pub fn expected_second_byte(self) -> u8 {
        match self {
            Ack::ConnAck | Ack::PubAck => 2,
            Ack::PingResp => 0,
        }
    }

    /// Checks `reply` against this acknowledgment's fixed header.
    pub fn matches(self, reply: &[u8]) -> bool {
        validate_ack(self.packet_type(), self.expected_second_byte(), reply)
    }
}

/// Minimal acknowledgment check: the first byte must be `expected_type << 4`
/// and the second byte must equal `expected_second_byte`.
pub fn validate_ack(expected_type: PacketType, expected_second_byte: u8, reply: &[u8]) -> bool {
    matches!(reply, [first, second, ..]
        if *first == expected_type.header() && *second == expected_second_byte)
}

/// The return code carried in the fourth byte of a `CONNACK`.
pub fn connack_return_code(reply: &[u8]) -> Option<ConnectReturnCode> {
    reply.get(3).map(|&code| ConnectReturnCode::from(code))
}
