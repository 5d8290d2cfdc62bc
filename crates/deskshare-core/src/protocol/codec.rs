//! Binary codec for the deskshare remote-input channel.
//!
//! Wire format:
//! ```text
//! [opcode:2][length:2][body:N]
//! ```
//! Header size: 4 bytes. All multi-byte integers are big-endian. `length`
//! declares the body width, with one quirk kept for compatibility with
//! deployed viewers: a Pong declares the whole frame, header included.
//!
//! Decoding is split in two so the caller can gate body decodes on sender
//! role: [`decode_header`] strips the header, then either a typed per-shape
//! decoder or the [`decode_body`] table consumes the rest.

use thiserror::Error;

use crate::protocol::messages::{
    ControlMessage, Header, KeyPayload, MovePayload, Opcode, PingPayload, PongPayload,
    ScrollPayload, TouchPayload, HEADER_SIZE, KEY_BODY_LEN, MOVE_BODY_LEN, PING_BODY_LEN,
    PONG_BODY_LEN, PONG_MESSAGE_LEN, SCROLL_BODY_LEN, SCROLL_LEGACY_BODY_LEN, TOUCH_BODY_LEN,
};

/// Errors raised while decoding a frame.
///
/// Both variants are fatal to the single message and never to the channel;
/// the caller drops the frame and keeps the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer is shorter than the fixed 4-byte header.
    #[error("malformed header: got {available} of 4 header bytes")]
    MalformedHeader { available: usize },

    /// The body is shorter than required, or the declared length matches no
    /// shape of the opcode.
    #[error("malformed body for opcode 0x{opcode:04X}: declared {declared} bytes, got {available}")]
    MalformedBody {
        opcode: u16,
        declared: u16,
        available: usize,
    },
}

// ── Header ────────────────────────────────────────────────────────────────────

/// Splits the fixed header off the front of a raw frame.
///
/// Returns the header and the remaining bytes positioned at the body. The
/// opcode is not validated here; unknown opcodes are a dispatch concern.
///
/// # Errors
///
/// [`ProtocolError::MalformedHeader`] when fewer than 4 bytes are present.
pub fn decode_header(frame: &[u8]) -> Result<(Header, &[u8]), ProtocolError> {
    if frame.len() < HEADER_SIZE {
        return Err(ProtocolError::MalformedHeader {
            available: frame.len(),
        });
    }
    let opcode = u16::from_be_bytes([frame[0], frame[1]]);
    let length = u16::from_be_bytes([frame[2], frame[3]]);
    Ok((Header { opcode, length }, &frame[HEADER_SIZE..]))
}

// ── Body decoders ─────────────────────────────────────────────────────────────

fn require_body(
    opcode: Opcode,
    declared: u16,
    expected: u16,
    body: &[u8],
) -> Result<(), ProtocolError> {
    if declared != expected || body.len() < expected as usize {
        return Err(ProtocolError::MalformedBody {
            opcode: opcode as u16,
            declared,
            available: body.len(),
        });
    }
    Ok(())
}

/// Decodes a cursor move body.
pub fn decode_move(body: &[u8], declared: u16) -> Result<MovePayload, ProtocolError> {
    require_body(Opcode::Move, declared, MOVE_BODY_LEN, body)?;
    Ok(MovePayload {
        x: i16::from_be_bytes([body[0], body[1]]),
        y: i16::from_be_bytes([body[2], body[3]]),
    })
}

/// Decodes a latency probe body. The words are opaque to the server.
pub fn decode_ping(body: &[u8], declared: u16) -> Result<PingPayload, ProtocolError> {
    require_body(Opcode::Ping, declared, PING_BODY_LEN, body)?;
    Ok(PingPayload {
        client_ts_high: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
        client_ts_low: u32::from_be_bytes([body[4], body[5], body[6], body[7]]),
    })
}

/// Decodes a latency reply body.
///
/// A Pong declares [`PONG_MESSAGE_LEN`], the whole frame including the
/// header, while its body is [`PONG_BODY_LEN`] bytes.
pub fn decode_pong(body: &[u8], declared: u16) -> Result<PongPayload, ProtocolError> {
    if declared != PONG_MESSAGE_LEN || body.len() < PONG_BODY_LEN as usize {
        return Err(ProtocolError::MalformedBody {
            opcode: Opcode::Pong as u16,
            declared,
            available: body.len(),
        });
    }
    Ok(PongPayload {
        ping: PingPayload {
            client_ts_high: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
            client_ts_low: u32::from_be_bytes([body[4], body[5], body[6], body[7]]),
        },
        server_ts_high: u32::from_be_bytes([body[8], body[9], body[10], body[11]]),
        server_ts_low: u32::from_be_bytes([body[12], body[13], body[14], body[15]]),
    })
}

/// Decodes a scroll body, selecting the shape by declared length.
///
/// A declared length of [`SCROLL_LEGACY_BODY_LEN`] selects
/// [`ScrollPayload::Legacy`]; [`SCROLL_BODY_LEN`] selects
/// [`ScrollPayload::Current`]. Any other declared length is malformed.
pub fn decode_scroll(body: &[u8], declared: u16) -> Result<ScrollPayload, ProtocolError> {
    match declared {
        SCROLL_LEGACY_BODY_LEN if body.len() >= SCROLL_LEGACY_BODY_LEN as usize => {
            Ok(ScrollPayload::Legacy {
                x: i16::from_be_bytes([body[0], body[1]]),
                y: i16::from_be_bytes([body[2], body[3]]),
            })
        }
        SCROLL_BODY_LEN if body.len() >= SCROLL_BODY_LEN as usize => Ok(ScrollPayload::Current {
            delta_x: i16::from_be_bytes([body[0], body[1]]),
            delta_y: i16::from_be_bytes([body[2], body[3]]),
            control_key: body[4] != 0,
        }),
        _ => Err(ProtocolError::MalformedBody {
            opcode: Opcode::Scroll as u16,
            declared,
            available: body.len(),
        }),
    }
}

/// Decodes a key or button body.
///
/// `opcode` names which of the four key/button events is being decoded and
/// only affects error attribution; the shape is shared.
pub fn decode_key(opcode: Opcode, body: &[u8], declared: u16) -> Result<KeyPayload, ProtocolError> {
    require_body(opcode, declared, KEY_BODY_LEN, body)?;
    Ok(KeyPayload {
        code: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
    })
}

/// Decodes a touch body. `opcode` names the begin/update/end event for
/// error attribution; the shape is shared.
pub fn decode_touch(
    opcode: Opcode,
    body: &[u8],
    declared: u16,
) -> Result<TouchPayload, ProtocolError> {
    require_body(opcode, declared, TOUCH_BODY_LEN, body)?;
    Ok(TouchPayload {
        touch_id: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
        x: i16::from_be_bytes([body[4], body[5]]),
        y: i16::from_be_bytes([body[6], body[7]]),
        pressure: body[8],
    })
}

/// Decodes the body for a decoded header into a typed message.
///
/// This is the full per-opcode decode table. Unknown opcodes yield
/// `Ok(None)` so unrecognized message types can be dropped rather than
/// rejected. Callers that must not decode bodies for unauthorized senders
/// use the typed decoders directly instead.
pub fn decode_body(header: &Header, body: &[u8]) -> Result<Option<ControlMessage>, ProtocolError> {
    let Some(opcode) = Opcode::from_u16(header.opcode) else {
        return Ok(None);
    };
    let message = match opcode {
        Opcode::Move => ControlMessage::Move(decode_move(body, header.length)?),
        Opcode::Scroll => ControlMessage::Scroll(decode_scroll(body, header.length)?),
        Opcode::KeyDown => ControlMessage::KeyDown(decode_key(opcode, body, header.length)?),
        Opcode::KeyUp => ControlMessage::KeyUp(decode_key(opcode, body, header.length)?),
        Opcode::ButtonDown => ControlMessage::ButtonDown(decode_key(opcode, body, header.length)?),
        Opcode::ButtonUp => ControlMessage::ButtonUp(decode_key(opcode, body, header.length)?),
        Opcode::Ping => ControlMessage::Ping(decode_ping(body, header.length)?),
        Opcode::Pong => ControlMessage::Pong(decode_pong(body, header.length)?),
        Opcode::TouchBegin => ControlMessage::TouchBegin(decode_touch(opcode, body, header.length)?),
        Opcode::TouchUpdate => {
            ControlMessage::TouchUpdate(decode_touch(opcode, body, header.length)?)
        }
        Opcode::TouchEnd => ControlMessage::TouchEnd(decode_touch(opcode, body, header.length)?),
    };
    Ok(Some(message))
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a message into a complete frame, header included.
pub fn encode_message(message: &ControlMessage) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_SIZE + PONG_BODY_LEN as usize);
    frame.extend_from_slice(&(message.opcode() as u16).to_be_bytes());
    frame.extend_from_slice(&message.declared_len().to_be_bytes());

    match message {
        ControlMessage::Move(p) => {
            frame.extend_from_slice(&p.x.to_be_bytes());
            frame.extend_from_slice(&p.y.to_be_bytes());
        }
        ControlMessage::Scroll(ScrollPayload::Legacy { x, y }) => {
            frame.extend_from_slice(&x.to_be_bytes());
            frame.extend_from_slice(&y.to_be_bytes());
        }
        ControlMessage::Scroll(ScrollPayload::Current {
            delta_x,
            delta_y,
            control_key,
        }) => {
            frame.extend_from_slice(&delta_x.to_be_bytes());
            frame.extend_from_slice(&delta_y.to_be_bytes());
            frame.push(if *control_key { 0x01 } else { 0x00 });
        }
        ControlMessage::KeyDown(p)
        | ControlMessage::KeyUp(p)
        | ControlMessage::ButtonDown(p)
        | ControlMessage::ButtonUp(p) => {
            frame.extend_from_slice(&p.code.to_be_bytes());
        }
        ControlMessage::Ping(p) => {
            frame.extend_from_slice(&p.client_ts_high.to_be_bytes());
            frame.extend_from_slice(&p.client_ts_low.to_be_bytes());
        }
        ControlMessage::Pong(p) => {
            frame.extend_from_slice(&p.ping.client_ts_high.to_be_bytes());
            frame.extend_from_slice(&p.ping.client_ts_low.to_be_bytes());
            frame.extend_from_slice(&p.server_ts_high.to_be_bytes());
            frame.extend_from_slice(&p.server_ts_low.to_be_bytes());
        }
        ControlMessage::TouchBegin(p)
        | ControlMessage::TouchUpdate(p)
        | ControlMessage::TouchEnd(p) => {
            frame.extend_from_slice(&p.touch_id.to_be_bytes());
            frame.extend_from_slice(&p.x.to_be_bytes());
            frame.extend_from_slice(&p.y.to_be_bytes());
            frame.push(p.pressure);
        }
    }
    frame
}

/// Builds the complete Pong reply frame for a received ping.
///
/// The ping words are echoed verbatim; `server_ts_millis` is the wall clock
/// captured at reply construction.
pub fn encode_pong(ping: &PingPayload, server_ts_millis: u64) -> Vec<u8> {
    let (server_ts_high, server_ts_low) = split_server_timestamp(server_ts_millis);
    encode_message(&ControlMessage::Pong(PongPayload {
        ping: *ping,
        server_ts_high,
        server_ts_low,
    }))
}

// ── Server timestamp arithmetic ───────────────────────────────────────────────

/// Modulus used to split the server timestamp: `u32::MAX`, i.e. 2^32 − 1.
///
/// Deployed viewers reconstruct with this exact constant, so it stays even
/// though 2^32 would be the natural radix.
const TS_WORD: u64 = u32::MAX as u64;

/// Splits an epoch-millisecond timestamp into the two words carried by a
/// Pong. [`join_server_timestamp`] is the matching inverse.
pub fn split_server_timestamp(millis: u64) -> (u32, u32) {
    ((millis / TS_WORD) as u32, (millis % TS_WORD) as u32)
}

/// Reassembles a timestamp split by [`split_server_timestamp`].
pub fn join_server_timestamp(high: u32, low: u32) -> u64 {
    u64::from(high) * TS_WORD + u64::from(low)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
