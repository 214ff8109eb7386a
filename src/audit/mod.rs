//! Decision audit trail.
//!
//! Every verdict rendered by the [`Authorizer`](crate::Authorizer) can be
//! turned into an [`AuditEvent`] and emitted as a structured `tracing` event
//! on the `privacy_audit` target. Events carry ids, the action, the verdict
//! and the reason. Response payloads are never recorded.

mod event;
mod trail;

pub use event::{AuditEvent, AuditOutcome};
pub use trail::AuditTrail;

/// Tracing target audit events are emitted on.
pub const AUDIT_TARGET: &str = "privacy_audit";

/// Emits an audit event through `tracing`.
pub fn emit(event: &AuditEvent) {
    tracing::info!(
        target: AUDIT_TARGET,
        requester = %event.requester(),
        target_user = ?event.target(),
        action = %event.action(),
        outcome = %event.outcome(),
        handler = ?event.handler().map(|tag| tag.to_string()),
        reason = %event.reason(),
        "privacy decision"
    );
}

/// Emits an audit event and appends it to `trail`.
pub fn emit_and_record(event: AuditEvent, trail: &AuditTrail) {
    emit(&event);
    trail.record(event);
}
