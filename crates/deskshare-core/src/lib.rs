//! # deskshare-core
//!
//! Shared wire protocol and binary codec for the deskshare remote-input
//! channel: the ordered data channel on which viewer clients send cursor
//! moves, input events, and latency probes to the process hosting a shared
//! desktop session.
//!
//! This crate is pure data plumbing. It has zero dependencies on OS APIs,
//! sockets, or the desktop automation backend, so both the session host and
//! Rust viewer clients can link it.
//!
//! - **`protocol::messages`** – the opcode space, the 4-byte frame header,
//!   and the typed payload records.
//! - **`protocol::codec`** – big-endian decoding and encoding, including
//!   the two-word server timestamp arithmetic used by latency replies.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `deskshare_core::ControlMessage` instead of the full path.
pub use protocol::codec::{
    decode_body, decode_header, encode_message, encode_pong, join_server_timestamp,
    split_server_timestamp, ProtocolError,
};
pub use protocol::messages::{ControlMessage, Header, Opcode, ScrollPayload};
