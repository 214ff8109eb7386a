//! Audit event schema.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::action::Action;
use crate::gateway::UserId;
use crate::request::PrivacyRequest;
use crate::response::{HandlerTag, PrivacyResponse};

/// Verdict recorded for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Access was allowed
    Granted,
    /// Access was refused, for whatever reason
    Denied,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Granted => write!(f, "granted"),
            AuditOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// A record of one authorization decision.
///
/// Holds only ids, the action, the verdict, the deciding handler and the
/// user-safe reason. Profile data, attendee lists and schedules are never
/// copied into an event.
///
/// # Example
///
/// ```
/// use privacy_policy::Action;
/// use privacy_policy::audit::{AuditEvent, AuditOutcome};
///
/// let event = AuditEvent::new("u1", Action::ViewProfile, AuditOutcome::Denied)
///     .with_target("u2")
///     .with_reason("Access blocked");
///
/// assert_eq!(event.requester(), "u1");
/// assert_eq!(event.target(), Some("u2"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    requester: UserId,
    target: Option<UserId>,
    action: Action,
    outcome: AuditOutcome,
    handler: Option<HandlerTag>,
    reason: String,
    recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    pub fn new(requester: impl Into<UserId>, action: Action, outcome: AuditOutcome) -> Self {
        Self {
            requester: requester.into(),
            target: None,
            action,
            outcome,
            handler: None,
            reason: String::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Builds the event describing `response` as the answer to `request`.
    pub fn from_decision(request: &PrivacyRequest, response: &PrivacyResponse) -> Self {
        let outcome = if response.allowed() {
            AuditOutcome::Granted
        } else {
            AuditOutcome::Denied
        };
        let mut event = Self::new(request.requester_id(), request.action(), outcome)
            .with_reason(response.reason());
        event.target = request.target_id().map(str::to_string);
        event.handler = response.handler();
        event
    }

    /// Sets the user the request was about.
    pub fn with_target(mut self, target: impl Into<UserId>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the handler branch that decided.
    pub fn with_handler(mut self, handler: HandlerTag) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the reason given to the caller.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Sets the timestamp.
    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Returns the requesting user.
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Returns the target user, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Returns the requested action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the verdict.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the deciding handler branch; `None` for the chain's default deny.
    pub fn handler(&self) -> Option<HandlerTag> {
        self.handler
    }

    /// Returns the reason given to the caller.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns when the event was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[outcome={}, action={}, requester={}, target={}",
            self.outcome,
            self.action,
            self.requester,
            self.target.as_deref().unwrap_or("<none>")
        )?;
        if let Some(handler) = &self.handler {
            write!(f, ", handler={}", handler)?;
        }
        write!(f, ", reason={}]", self.reason)
    }
}
