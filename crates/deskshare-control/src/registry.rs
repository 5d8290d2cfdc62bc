//! Session identity and the shared cursor records, owned outside this crate.

use uuid::Uuid;

/// Identifies one connected viewer session.
pub type SessionId = Uuid;

/// Read/write surface over the external session registry.
///
/// Host status is a time-varying property: the registry hands it from
/// session to session while a message is potentially in flight. The
/// dispatcher queries it once per message and never caches it.
pub trait SessionRegistry: Send + Sync {
    /// True iff the session currently holds exclusive host control.
    fn is_host(&self, session: &SessionId) -> bool;

    /// Records a non-host session's own reported pointer position.
    ///
    /// Display-only state; never applied to the real desktop.
    fn set_advisory_cursor(&self, session: &SessionId, x: i16, y: i16);

    /// Updates the authoritative pointer position after a host move.
    fn set_host_cursor(&self, x: i16, y: i16);
}

/// The role gate: whether a session may mutate desktop state right now.
pub fn is_authorized_for_control(registry: &dyn SessionRegistry, session: &SessionId) -> bool {
    registry.is_host(session)
}
