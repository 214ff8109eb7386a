//! Reusable policy predicates and list filters shared by the handlers.
//!
//! Services never return gateway errors from a decision path. A failed read
//! is logged and replaced by the value that grants the least: predicates
//! answer "no", lookups answer "absent", listings answer "empty".

mod carpool;
mod privacy;
mod schedule;

use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;

pub use carpool::{CarpoolParticipant, CarpoolService};
pub use privacy::{AttendeeIdentity, AttendeeView, PrivacyService, SettingsUpdate};
pub use schedule::{SchedulePrivacyStatus, ScheduleService};

/// Unwraps a gateway result, logging and substituting `fallback` on failure.
pub(crate) fn or_safe_default<T>(result: Result<T, GatewayError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                operation = err.operation(),
                error = %err,
                "gateway failure, falling back to safe default"
            );
            fallback
        }
    }
}

/// Serializes a response payload.
pub(crate) fn to_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to serialize response payload");
        Value::Null
    })
}
