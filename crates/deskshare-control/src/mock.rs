//! Recording test doubles for the dispatcher's collaborators.
//!
//! The real desktop backend injects events into a live display server and
//! cannot be observed from test code; these doubles record every call in a
//! `Mutex<Vec<...>>` instead, so assertions can inspect exactly what was
//! invoked and in what order. The `should_fail` flags simulate backend or
//! channel failures without a broken environment.

use std::sync::Mutex;

use crate::clock::Clock;
use crate::control::{DesktopControl, DesktopControlError};
use crate::dispatch::ReplySender;
use crate::registry::{SessionId, SessionRegistry};

/// A desktop backend that records all calls without touching the OS.
#[derive(Default)]
pub struct RecordingDesktop {
    /// Each (x, y) passed to `move_to`.
    pub moves: Mutex<Vec<(i16, i16)>>,
    /// Each (delta_x, delta_y, control_key) passed to `scroll`.
    pub scrolls: Mutex<Vec<(i16, i16, bool)>>,
    pub key_downs: Mutex<Vec<u32>>,
    pub key_ups: Mutex<Vec<u32>>,
    pub button_downs: Mutex<Vec<u32>>,
    pub button_ups: Mutex<Vec<u32>>,
    /// Each (touch_id, x, y, pressure) per touch phase.
    pub touch_begins: Mutex<Vec<(u32, i16, i16, u8)>>,
    pub touch_updates: Mutex<Vec<(u32, i16, i16, u8)>>,
    pub touch_ends: Mutex<Vec<(u32, i16, i16, u8)>>,
    /// When set, every fallible method fails without recording.
    pub should_fail: bool,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of desktop calls recorded, across all operations.
    pub fn total_calls(&self) -> usize {
        self.moves.lock().unwrap().len()
            + self.scrolls.lock().unwrap().len()
            + self.key_downs.lock().unwrap().len()
            + self.key_ups.lock().unwrap().len()
            + self.button_downs.lock().unwrap().len()
            + self.button_ups.lock().unwrap().len()
            + self.touch_begins.lock().unwrap().len()
            + self.touch_updates.lock().unwrap().len()
            + self.touch_ends.lock().unwrap().len()
    }

    fn fallible(&self, record: impl FnOnce()) -> Result<(), DesktopControlError> {
        if self.should_fail {
            return Err(DesktopControlError::Backend("injected failure".to_string()));
        }
        record();
        Ok(())
    }
}

impl DesktopControl for RecordingDesktop {
    fn move_to(&self, x: i16, y: i16) {
        self.moves.lock().unwrap().push((x, y));
    }

    fn scroll(&self, delta_x: i16, delta_y: i16, control_key: bool) {
        self.scrolls
            .lock()
            .unwrap()
            .push((delta_x, delta_y, control_key));
    }

    fn key_down(&self, code: u32) -> Result<(), DesktopControlError> {
        self.fallible(|| self.key_downs.lock().unwrap().push(code))
    }

    fn key_up(&self, code: u32) -> Result<(), DesktopControlError> {
        self.fallible(|| self.key_ups.lock().unwrap().push(code))
    }

    fn button_down(&self, code: u32) -> Result<(), DesktopControlError> {
        self.fallible(|| self.button_downs.lock().unwrap().push(code))
    }

    fn button_up(&self, code: u32) -> Result<(), DesktopControlError> {
        self.fallible(|| self.button_ups.lock().unwrap().push(code))
    }

    fn touch_begin(
        &self,
        touch_id: u32,
        x: i16,
        y: i16,
        pressure: u8,
    ) -> Result<(), DesktopControlError> {
        self.fallible(|| {
            self.touch_begins
                .lock()
                .unwrap()
                .push((touch_id, x, y, pressure))
        })
    }

    fn touch_update(
        &self,
        touch_id: u32,
        x: i16,
        y: i16,
        pressure: u8,
    ) -> Result<(), DesktopControlError> {
        self.fallible(|| {
            self.touch_updates
                .lock()
                .unwrap()
                .push((touch_id, x, y, pressure))
        })
    }

    fn touch_end(
        &self,
        touch_id: u32,
        x: i16,
        y: i16,
        pressure: u8,
    ) -> Result<(), DesktopControlError> {
        self.fallible(|| {
            self.touch_ends
                .lock()
                .unwrap()
                .push((touch_id, x, y, pressure))
        })
    }
}

/// A session registry double with a settable host and recorded cursors.
#[derive(Default)]
pub struct RecordingRegistry {
    /// The session currently holding host control, if any.
    pub host: Mutex<Option<SessionId>>,
    /// Each (x, y) written to the authoritative host cursor record.
    pub host_cursor: Mutex<Vec<(i16, i16)>>,
    /// Each (session, x, y) advisory cursor update.
    pub advisory_cursors: Mutex<Vec<(SessionId, i16, i16)>>,
}

impl RecordingRegistry {
    /// A registry where `host` holds control.
    pub fn with_host(host: SessionId) -> Self {
        Self {
            host: Mutex::new(Some(host)),
            ..Self::default()
        }
    }
}

impl SessionRegistry for RecordingRegistry {
    fn is_host(&self, session: &SessionId) -> bool {
        *self.host.lock().unwrap() == Some(*session)
    }

    fn set_advisory_cursor(&self, session: &SessionId, x: i16, y: i16) {
        self.advisory_cursors.lock().unwrap().push((*session, x, y));
    }

    fn set_host_cursor(&self, x: i16, y: i16) {
        self.host_cursor.lock().unwrap().push((x, y));
    }
}

/// A reply channel that captures outbound frames.
#[derive(Default)]
pub struct RecordingReplySender {
    pub frames: Mutex<Vec<Vec<u8>>>,
    pub should_fail: bool,
}

impl ReplySender for RecordingReplySender {
    fn send(&self, frame: &[u8]) -> Result<(), String> {
        if self.should_fail {
            return Err("channel closed".to_string());
        }
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}

/// A clock pinned to a fixed epoch-millisecond value.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_epoch_millis(&self) -> u64 {
        self.0
    }
}
