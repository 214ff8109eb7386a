use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::action::Action;
use crate::gateway::{EventId, UserId};

/// Context key holding the event a request refers to.
pub const EVENT_ID: &str = "eventId";

/// A single authorization question: may `requester` perform `action`?
///
/// The requester is always a resolved identity; the session layer is
/// responsible for that before a request is built. Apart from the context
/// map, a request does not change after construction.
///
/// # Examples
///
/// ```
/// use privacy_policy::{Action, PrivacyRequest};
///
/// let mut request = PrivacyRequest::new("u1", Action::ViewAttendees)
///     .with_functionality("event_page");
/// request.set_context("eventId", "e42");
///
/// assert_eq!(request.event_id().as_deref(), Some("e42"));
/// assert!(request.context("missing").is_none());
/// assert!(!request.is_self_request());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PrivacyRequest {
    requester_id: UserId,
    target_id: Option<UserId>,
    action: Action,
    functionality: String,
    context: HashMap<String, Value>,
}

impl PrivacyRequest {
    /// Creates a request without a target user.
    pub fn new(requester_id: impl Into<UserId>, action: Action) -> Self {
        Self {
            requester_id: requester_id.into(),
            target_id: None,
            action,
            functionality: String::new(),
            context: HashMap::new(),
        }
    }

    /// Creates a request aimed at a single target user.
    pub fn targeting(
        requester_id: impl Into<UserId>,
        target_id: impl Into<UserId>,
        action: Action,
    ) -> Self {
        Self::new(requester_id, action).with_target(target_id)
    }

    /// Sets the target user.
    pub fn with_target(mut self, target_id: impl Into<UserId>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Sets the free-text access purpose.
    pub fn with_functionality(mut self, functionality: impl Into<String>) -> Self {
        self.functionality = functionality.into();
        self
    }

    /// Sets a context entry, builder style.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_context(key, value);
        self
    }

    /// Sets a context entry, replacing any previous value for the key.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
    }

    /// Returns the context value for `key`, if present.
    pub fn context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Returns the event id from the context.
    ///
    /// Strings and numbers are accepted. Null, empty strings and any other
    /// JSON type count as "not provided".
    pub fn event_id(&self) -> Option<EventId> {
        match self.context(EVENT_ID)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns the requester's identity.
    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    /// Returns the target user, if the resource is a single user.
    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    /// Returns the requested action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the free-text access purpose.
    pub fn functionality(&self) -> &str {
        &self.functionality
    }

    /// True when the requester is asking about themselves.
    pub fn is_self_request(&self) -> bool {
        self.target_id.as_deref() == Some(self.requester_id.as_str())
    }
}

impl fmt::Display for PrivacyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrivacyRequest[requester={}, target={}, action={}",
            self.requester_id,
            self.target_id.as_deref().unwrap_or("<none>"),
            self.action,
        )?;
        if !self.functionality.is_empty() {
            write!(f, ", functionality={}", self.functionality)?;
        }
        if !self.context.is_empty() {
            let mut keys: Vec<_> = self.context.keys().map(String::as_str).collect();
            keys.sort_unstable();
            write!(f, ", context=[{}]", keys.join(","))?;
        }
        write!(f, "]")
    }
}
