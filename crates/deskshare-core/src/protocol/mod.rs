//! Protocol module containing message types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_body, decode_header, encode_message, encode_pong, ProtocolError};
pub use messages::*;
