//! All messages carried on the deskshare remote-input data channel.
//!
//! The channel is an ordered, low-latency byte pipe from a viewer client to
//! the process hosting the shared desktop. Every frame starts with a fixed
//! 4-byte header; bodies are fixed-size, densely packed, and every
//! multi-byte field is big-endian.

use serde::{Deserialize, Serialize};

// ── Wire constants ────────────────────────────────────────────────────────────

/// Size of the fixed frame header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Body width of a [`MovePayload`].
pub const MOVE_BODY_LEN: u16 = 4;

/// Body width of a [`PingPayload`].
pub const PING_BODY_LEN: u16 = 8;

/// Body width of a [`PongPayload`].
pub const PONG_BODY_LEN: u16 = 16;

/// Body width of the current scroll shape.
pub const SCROLL_BODY_LEN: u16 = 5;

/// Body width of the legacy scroll shape still emitted by older viewers.
pub const SCROLL_LEGACY_BODY_LEN: u16 = 4;

/// Body width of a [`KeyPayload`].
pub const KEY_BODY_LEN: u16 = 4;

/// Body width of a [`TouchPayload`].
pub const TOUCH_BODY_LEN: u16 = 9;

/// Declared length carried in a Pong header.
///
/// Unlike every inbound message, the Pong counts the header itself:
/// 4 header bytes + 16 body bytes. Deployed viewers expect this literal, so
/// it must not change without a protocol version bump.
pub const PONG_MESSAGE_LEN: u16 = 20;

// ── Opcodes ───────────────────────────────────────────────────────────────────

/// Numeric tag identifying a message's semantic type and body shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Opcode {
    Move = 0x01,
    Scroll = 0x02,
    KeyDown = 0x03,
    KeyUp = 0x04,
    ButtonDown = 0x05,
    ButtonUp = 0x06,
    Ping = 0x07,
    Pong = 0x08,
    TouchBegin = 0x09,
    TouchUpdate = 0x0A,
    TouchEnd = 0x0B,
}

impl Opcode {
    /// Maps a raw wire value to an opcode.
    ///
    /// Unknown values return `None` rather than an error: unrecognized
    /// message types are dropped by the dispatcher so the opcode space can
    /// grow without breaking older peers.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x01 => Some(Opcode::Move),
            0x02 => Some(Opcode::Scroll),
            0x03 => Some(Opcode::KeyDown),
            0x04 => Some(Opcode::KeyUp),
            0x05 => Some(Opcode::ButtonDown),
            0x06 => Some(Opcode::ButtonUp),
            0x07 => Some(Opcode::Ping),
            0x08 => Some(Opcode::Pong),
            0x09 => Some(Opcode::TouchBegin),
            0x0A => Some(Opcode::TouchUpdate),
            0x0B => Some(Opcode::TouchEnd),
            _ => None,
        }
    }
}

// ── Frame header ──────────────────────────────────────────────────────────────

/// 4-byte header prepended to every frame: opcode, then the declared byte
/// count of the body that follows.
///
/// The opcode is kept raw so frames from newer viewers stay representable;
/// resolve it with [`Opcode::from_u16`]. For the scroll opcode the declared
/// length doubles as the variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub opcode: u16,
    pub length: u16,
}

// ── Payload value types ───────────────────────────────────────────────────────

/// Absolute cursor coordinates reported by a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub x: i16,
    pub y: i16,
}

/// Opaque timestamp tag carried by a latency probe.
///
/// The two words are whatever the viewer sent. The server echoes them back
/// byte-for-byte and never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingPayload {
    pub client_ts_high: u32,
    pub client_ts_low: u32,
}

/// Latency probe reply: the received ping echoed verbatim, plus the server
/// wall clock split into two words (see
/// [`split_server_timestamp`](crate::protocol::codec::split_server_timestamp)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongPayload {
    pub ping: PingPayload,
    pub server_ts_high: u32,
    pub server_ts_low: u32,
}

/// Scroll body.
///
/// Two shapes share the scroll opcode and the header's declared length is
/// the only discriminator: 4 bytes selects [`ScrollPayload::Legacy`],
/// 5 bytes selects [`ScrollPayload::Current`]. Both shapes are kept for
/// viewers that predate the control-key flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollPayload {
    Legacy {
        x: i16,
        y: i16,
    },
    Current {
        delta_x: i16,
        delta_y: i16,
        control_key: bool,
    },
}

/// Key or button identifier. One shape serves key-down/up and
/// button-down/up; the opcode carries the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    pub code: u32,
}

/// Touch contact state shared by begin/update/end events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPayload {
    pub touch_id: u32,
    pub x: i16,
    pub y: i16,
    pub pressure: u8,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// All valid channel messages, discriminated by opcode.
///
/// Payloads are immutable value records constructed fresh per frame; none
/// outlives the call that decoded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMessage {
    Move(MovePayload),
    Scroll(ScrollPayload),
    KeyDown(KeyPayload),
    KeyUp(KeyPayload),
    ButtonDown(KeyPayload),
    ButtonUp(KeyPayload),
    Ping(PingPayload),
    Pong(PongPayload),
    TouchBegin(TouchPayload),
    TouchUpdate(TouchPayload),
    TouchEnd(TouchPayload),
}

impl ControlMessage {
    /// Returns the [`Opcode`] discriminant for this message.
    pub fn opcode(&self) -> Opcode {
        match self {
            ControlMessage::Move(_) => Opcode::Move,
            ControlMessage::Scroll(_) => Opcode::Scroll,
            ControlMessage::KeyDown(_) => Opcode::KeyDown,
            ControlMessage::KeyUp(_) => Opcode::KeyUp,
            ControlMessage::ButtonDown(_) => Opcode::ButtonDown,
            ControlMessage::ButtonUp(_) => Opcode::ButtonUp,
            ControlMessage::Ping(_) => Opcode::Ping,
            ControlMessage::Pong(_) => Opcode::Pong,
            ControlMessage::TouchBegin(_) => Opcode::TouchBegin,
            ControlMessage::TouchUpdate(_) => Opcode::TouchUpdate,
            ControlMessage::TouchEnd(_) => Opcode::TouchEnd,
        }
    }

    /// Returns the length this message declares in its header.
    ///
    /// The body width for everything except the Pong, which declares the
    /// full frame size ([`PONG_MESSAGE_LEN`]).
    pub fn declared_len(&self) -> u16 {
        match self {
            ControlMessage::Move(_) => MOVE_BODY_LEN,
            ControlMessage::Scroll(ScrollPayload::Legacy { .. }) => SCROLL_LEGACY_BODY_LEN,
            ControlMessage::Scroll(ScrollPayload::Current { .. }) => SCROLL_BODY_LEN,
            ControlMessage::KeyDown(_)
            | ControlMessage::KeyUp(_)
            | ControlMessage::ButtonDown(_)
            | ControlMessage::ButtonUp(_) => KEY_BODY_LEN,
            ControlMessage::Ping(_) => PING_BODY_LEN,
            ControlMessage::Pong(_) => PONG_MESSAGE_LEN,
            ControlMessage::TouchBegin(_)
            | ControlMessage::TouchUpdate(_)
            | ControlMessage::TouchEnd(_) => TOUCH_BODY_LEN,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_opcode_survives_a_wire_trip() {
        let all = [
            Opcode::Move,
            Opcode::Scroll,
            Opcode::KeyDown,
            Opcode::KeyUp,
            Opcode::ButtonDown,
            Opcode::ButtonUp,
            Opcode::Ping,
            Opcode::Pong,
            Opcode::TouchBegin,
            Opcode::TouchUpdate,
            Opcode::TouchEnd,
        ];

        for opcode in all {
            assert_eq!(Opcode::from_u16(opcode as u16), Some(opcode));
        }
    }

    #[test]
    fn test_unknown_opcode_maps_to_none() {
        assert_eq!(Opcode::from_u16(0x00), None);
        assert_eq!(Opcode::from_u16(0x0C), None);
        assert_eq!(Opcode::from_u16(0xFFFF), None);
    }

    #[test]
    fn test_declared_len_distinguishes_scroll_variants() {
        let legacy = ControlMessage::Scroll(ScrollPayload::Legacy { x: 1, y: 2 });
        let current = ControlMessage::Scroll(ScrollPayload::Current {
            delta_x: 1,
            delta_y: 2,
            control_key: true,
        });

        assert_eq!(legacy.declared_len(), SCROLL_LEGACY_BODY_LEN);
        assert_eq!(current.declared_len(), SCROLL_BODY_LEN);
    }

    #[test]
    fn test_pong_declares_full_frame_length() {
        let pong = ControlMessage::Pong(PongPayload {
            ping: PingPayload {
                client_ts_high: 0,
                client_ts_low: 0,
            },
            server_ts_high: 0,
            server_ts_low: 0,
        });

        assert_eq!(
            pong.declared_len() as usize,
            HEADER_SIZE + PONG_BODY_LEN as usize
        );
    }
}
