//! Desktop automation surface consumed by the dispatcher.
//!
//! The real implementation injects events into the live display server
//! backing the shared session. This crate only defines the seam; the
//! dispatcher calls it and treats every failure as message-scoped.

use thiserror::Error;

/// Errors surfaced by the desktop automation backend.
#[derive(Debug, Error)]
pub enum DesktopControlError {
    /// The backend rejected a key or button identifier.
    #[error("unsupported input code: 0x{0:08X}")]
    UnsupportedCode(u32),

    /// The backend has no contact for the given touch id.
    #[error("unknown touch id: {0}")]
    UnknownTouchId(u32),

    /// Any other backend failure.
    #[error("desktop backend error: {0}")]
    Backend(String),
}

/// Drives real input on the shared desktop.
///
/// Implementations must tolerate concurrent, possibly interleaved calls;
/// the dispatcher serializes nothing. Only the session holding host control
/// ever reaches these methods.
pub trait DesktopControl: Send + Sync {
    /// Moves the real pointer to an absolute position.
    fn move_to(&self, x: i16, y: i16);

    /// Scrolls by the given deltas; `control_key` reports the viewer's
    /// modifier state during the gesture.
    fn scroll(&self, delta_x: i16, delta_y: i16, control_key: bool);

    /// Presses the key identified by `code`.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopControlError`] when the backend cannot inject the
    /// event, e.g. for a key code it does not map.
    fn key_down(&self, code: u32) -> Result<(), DesktopControlError>;

    /// Releases the key identified by `code`.
    fn key_up(&self, code: u32) -> Result<(), DesktopControlError>;

    /// Presses the pointer button identified by `code`.
    fn button_down(&self, code: u32) -> Result<(), DesktopControlError>;

    /// Releases the pointer button identified by `code`.
    fn button_up(&self, code: u32) -> Result<(), DesktopControlError>;

    /// Starts a touch contact.
    fn touch_begin(&self, touch_id: u32, x: i16, y: i16, pressure: u8)
        -> Result<(), DesktopControlError>;

    /// Moves an existing touch contact.
    fn touch_update(
        &self,
        touch_id: u32,
        x: i16,
        y: i16,
        pressure: u8,
    ) -> Result<(), DesktopControlError>;

    /// Lifts a touch contact.
    fn touch_end(&self, touch_id: u32, x: i16, y: i16, pressure: u8)
        -> Result<(), DesktopControlError>;
}
