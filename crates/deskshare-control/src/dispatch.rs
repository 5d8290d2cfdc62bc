//! Routing of raw input frames to their effects.
//!
//! Control flow per frame: header decode, then either the latency
//! responder, or the role gate followed by a body decode and one desktop
//! call. Each frame is an independent unit of work; nothing survives a call
//! and no lock is held here, so frames from different sessions (or
//! back-to-back frames of one session) may be handled concurrently.

use std::sync::Arc;

use deskshare_core::protocol::codec::{self, decode_header, encode_pong, ProtocolError};
use deskshare_core::protocol::messages::{Opcode, PingPayload, ScrollPayload};
use thiserror::Error;
use tracing::{trace, warn};

use crate::clock::Clock;
use crate::control::DesktopControl;
use crate::registry::{is_authorized_for_control, SessionId, SessionRegistry};

/// Errors a caller must handle. Everything else is message-scoped and
/// recovered inside the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The frame was malformed; drop it, keep the session.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The Pong reply could not be written back to the viewer. The caller
    /// owns the channel and decides whether to tear it down.
    #[error("pong reply send failed: {0}")]
    ReplySend(String),
}

/// Back-channel to the viewer a frame arrived from.
///
/// Passed per call so the reply always travels the same channel as the
/// request. One synchronous fire-and-forget write; no retry, no awaited
/// acknowledgment.
pub trait ReplySender {
    fn send(&self, frame: &[u8]) -> Result<(), String>;
}

/// Stateless router from raw frames to collaborator effects.
///
/// Holds only shared handles to its collaborators; host status is read
/// from the registry on every call, never cached.
pub struct InputDispatcher {
    desktop: Arc<dyn DesktopControl>,
    registry: Arc<dyn SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl InputDispatcher {
    pub fn new(
        desktop: Arc<dyn DesktopControl>,
        registry: Arc<dyn SessionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            desktop,
            registry,
            clock,
        }
    }

    /// Handles one inbound frame from `session`.
    ///
    /// Cursor moves are processed for every sender (host moves drive the
    /// real pointer, others update an advisory record); latency probes are
    /// answered regardless of role; everything else mutates desktop state
    /// and is silently dropped unless the sender holds host control.
    /// Unknown opcodes are dropped, not rejected.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Protocol`] when the frame is malformed and
    /// [`DispatchError::ReplySend`] when a Pong cannot be written back.
    /// Desktop backend failures are logged at warn level and swallowed; one
    /// bad input event must never terminate the session.
    pub fn handle(
        &self,
        session: &SessionId,
        frame: &[u8],
        reply: &dyn ReplySender,
    ) -> Result<(), DispatchError> {
        let is_host = is_authorized_for_control(self.registry.as_ref(), session);
        let (header, body) = decode_header(frame)?;

        let Some(opcode) = Opcode::from_u16(header.opcode) else {
            trace!(opcode = header.opcode, "dropping unknown opcode");
            return Ok(());
        };

        match opcode {
            Opcode::Move => {
                let mv = codec::decode_move(body, header.length)?;
                if is_host {
                    self.desktop.move_to(mv.x, mv.y);
                    self.registry.set_host_cursor(mv.x, mv.y);
                } else {
                    self.registry.set_advisory_cursor(session, mv.x, mv.y);
                }
            }
            Opcode::Ping => {
                let ping = codec::decode_ping(body, header.length)?;
                self.respond_to_ping(&ping, reply)?;
            }

            // Everything below mutates desktop state. Non-host senders are
            // dropped silently: no error, no reply.
            _ if !is_host => {}

            Opcode::Scroll => match codec::decode_scroll(body, header.length)? {
                ScrollPayload::Legacy { x, y } => {
                    self.desktop.scroll(x, y, false);
                    trace!(x, y, "scroll (legacy)");
                }
                ScrollPayload::Current {
                    delta_x,
                    delta_y,
                    control_key,
                } => {
                    self.desktop.scroll(delta_x, delta_y, control_key);
                    trace!(delta_x, delta_y, control_key, "scroll");
                }
            },
            Opcode::KeyDown => {
                let key = codec::decode_key(opcode, body, header.length)?;
                match self.desktop.key_down(key.code) {
                    Ok(()) => trace!(key = key.code, "key down"),
                    Err(e) => warn!(error = %e, key = key.code, "key down failed"),
                }
            }
            Opcode::KeyUp => {
                let key = codec::decode_key(opcode, body, header.length)?;
                match self.desktop.key_up(key.code) {
                    Ok(()) => trace!(key = key.code, "key up"),
                    Err(e) => warn!(error = %e, key = key.code, "key up failed"),
                }
            }
            Opcode::ButtonDown => {
                let key = codec::decode_key(opcode, body, header.length)?;
                match self.desktop.button_down(key.code) {
                    Ok(()) => trace!(button = key.code, "button down"),
                    Err(e) => warn!(error = %e, button = key.code, "button down failed"),
                }
            }
            Opcode::ButtonUp => {
                let key = codec::decode_key(opcode, body, header.length)?;
                match self.desktop.button_up(key.code) {
                    Ok(()) => trace!(button = key.code, "button up"),
                    Err(e) => warn!(error = %e, button = key.code, "button up failed"),
                }
            }
            Opcode::TouchBegin => {
                let t = codec::decode_touch(opcode, body, header.length)?;
                match self.desktop.touch_begin(t.touch_id, t.x, t.y, t.pressure) {
                    Ok(()) => trace!(touch_id = t.touch_id, "touch begin"),
                    Err(e) => warn!(error = %e, touch_id = t.touch_id, "touch begin failed"),
                }
            }
            Opcode::TouchUpdate => {
                let t = codec::decode_touch(opcode, body, header.length)?;
                match self.desktop.touch_update(t.touch_id, t.x, t.y, t.pressure) {
                    Ok(()) => trace!(touch_id = t.touch_id, "touch update"),
                    Err(e) => warn!(error = %e, touch_id = t.touch_id, "touch update failed"),
                }
            }
            Opcode::TouchEnd => {
                let t = codec::decode_touch(opcode, body, header.length)?;
                match self.desktop.touch_end(t.touch_id, t.x, t.y, t.pressure) {
                    Ok(()) => trace!(touch_id = t.touch_id, "touch end"),
                    Err(e) => warn!(error = %e, touch_id = t.touch_id, "touch end failed"),
                }
            }

            // Pongs travel server-to-viewer only; one arriving here is
            // dropped like any unrecognized message.
            Opcode::Pong => trace!("dropping inbound pong"),
        }

        Ok(())
    }

    /// Answers a latency probe: the received words echoed verbatim plus the
    /// wall clock captured now, written back on the request's own channel.
    fn respond_to_ping(
        &self,
        ping: &PingPayload,
        reply: &dyn ReplySender,
    ) -> Result<(), DispatchError> {
        let server_ts = self.clock.now_epoch_millis();
        let frame = encode_pong(ping, server_ts);
        reply.send(&frame).map_err(DispatchError::ReplySend)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
