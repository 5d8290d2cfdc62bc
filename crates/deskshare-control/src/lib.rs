//! # deskshare-control
//!
//! The decode-validate-dispatch pipeline for the deskshare remote-input
//! channel. One call per inbound frame: strip the header, decode the
//! type-specific body, and route it to one of three effects: update a
//! cursor record, answer a latency probe, or (for the session holding host
//! control) drive the shared desktop.
//!
//! The transport that delivers frames, the automation backend that moves
//! the real pointer, and the registry that tracks host status all live
//! outside this crate and are consumed through the traits defined here, so
//! the dispatcher stays a pure function of (frame, role, collaborators).

pub mod clock;
pub mod control;
pub mod dispatch;
pub mod mock;
pub mod registry;

pub use clock::{Clock, SystemClock};
pub use control::{DesktopControl, DesktopControlError};
pub use dispatch::{DispatchError, InputDispatcher, ReplySender};
pub use registry::{is_authorized_for_control, SessionId, SessionRegistry};
