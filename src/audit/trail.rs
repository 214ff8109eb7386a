//! In-memory audit trail recorder.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AuditEvent, AuditOutcome};

/// In-memory recorder for audit events.
///
/// Safe to share between concurrent authorizations behind an `Arc`.
///
/// # Example
///
/// ```
/// use privacy_policy::Action;
/// use privacy_policy::audit::{AuditEvent, AuditOutcome, AuditTrail};
///
/// let trail = AuditTrail::new();
/// trail.record(AuditEvent::new("u1", Action::ViewProfile, AuditOutcome::Granted));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an audit event. Events keep the order they were recorded in.
    pub fn record(&self, event: AuditEvent) {
        self.lock().push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Returns the recorded denials.
    pub fn denials(&self) -> Vec<AuditEvent> {
        self.lock()
            .iter()
            .filter(|event| event.outcome() == AuditOutcome::Denied)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
