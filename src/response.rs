use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::action::Action;

const ACCESS_GRANTED: &str = "Access granted";
const ACCESS_DENIED: &str = "Access denied";

/// The policy branch that produced a response.
///
/// Used only for diagnostics; callers decide on [`PrivacyResponse::allowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Branch {
    /// Requester is the target
    SelfAccess,
    /// Requester and target are not the same user
    Other,
    /// A block exists in either direction
    Blocked,
    /// Target has no privacy settings
    NotFound,
    /// Target is anonymous; identity was redacted
    Anonymous,
    /// Resource is public
    Public,
    /// Requester and target are accepted friends
    Friends,
    /// Resource is private
    Private,
    /// No rule granted access
    Default,
    /// Requester created the event
    Owner,
    /// Requester attends the event
    Attendee,
    /// Eligibility check refused access
    Denied,
    /// Request carried no event id
    NoEvent,
    /// Event id did not resolve
    EventNotFound,
    /// Request carried no target user
    NoTarget,
    /// Handler claimed the action without a policy for it
    NotImplemented,
}

impl Branch {
    /// Returns the branch label used in diagnostic tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::SelfAccess => "Self",
            Branch::Other => "Other",
            Branch::Blocked => "Blocked",
            Branch::NotFound => "NotFound",
            Branch::Anonymous => "Anonymous",
            Branch::Public => "Public",
            Branch::Friends => "Friends",
            Branch::Private => "Private",
            Branch::Default => "Default",
            Branch::Owner => "Owner",
            Branch::Attendee => "Attendee",
            Branch::Denied => "Denied",
            Branch::NoEvent => "NoEvent",
            Branch::EventNotFound => "EventNotFound",
            Branch::NoTarget => "NoTarget",
            Branch::NotImplemented => "NotImplemented",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the handler and branch that rendered a verdict.
///
/// Displays as `<HandlerName>-<Branch>`, e.g. `ViewProfileHandler-Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerTag {
    action: Action,
    branch: Branch,
}

impl HandlerTag {
    /// Creates a tag for the handler owning `action`.
    pub fn new(action: Action, branch: Branch) -> Self {
        Self { action, branch }
    }

    /// Returns the action whose handler produced the response.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the policy branch.
    pub fn branch(&self) -> Branch {
        self.branch
    }
}

impl fmt::Display for HandlerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.action.handler_name(), self.branch)
    }
}

impl Serialize for HandlerTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The verdict of an authorization decision.
///
/// When `allowed` is false the payload is either absent or an explicit
/// placeholder; the protected data is never attached to a denial.
///
/// # Examples
///
/// ```
/// use privacy_policy::{Action, Branch, HandlerTag, PrivacyResponse};
/// use serde_json::json;
///
/// let granted = PrivacyResponse::success(json!({"id": "u2"}))
///     .with_handler(HandlerTag::new(Action::ViewProfile, Branch::Public));
/// assert!(granted.allowed());
/// assert_eq!(granted.reason(), "Access granted");
/// assert_eq!(granted.handler().unwrap().to_string(), "ViewProfileHandler-Public");
///
/// let denied = PrivacyResponse::failure("Access blocked");
/// assert!(!denied.allowed());
/// assert!(denied.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyResponse {
    allowed: bool,
    data: Option<Value>,
    is_anon: bool,
    anon_name: Option<String>,
    reason: String,
    handler: Option<HandlerTag>,
}

impl PrivacyResponse {
    fn new(allowed: bool, data: Option<Value>, is_anon: bool, anon_name: Option<String>) -> Self {
        let reason = if allowed { ACCESS_GRANTED } else { ACCESS_DENIED };
        Self {
            allowed,
            data,
            is_anon,
            anon_name,
            reason: reason.to_string(),
            handler: None,
        }
    }

    /// Grants access with the real payload.
    pub fn success(data: Value) -> Self {
        Self::new(true, Some(data), false, None)
    }

    /// Grants access with a payload whose identity has been redacted.
    pub fn anonymous(data: Value, anon_name: impl Into<String>) -> Self {
        Self::new(true, Some(data), true, Some(anon_name.into()))
    }

    /// Denies access with no payload.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::new(false, None, false, None).with_reason(reason)
    }

    /// Denies access and attaches an explicit placeholder payload.
    pub fn denied_with(placeholder: Value, reason: impl Into<String>) -> Self {
        Self::new(false, Some(placeholder), false, None).with_reason(reason)
    }

    /// The chain's terminal verdict when no handler claims the action.
    pub fn default_deny() -> Self {
        Self::new(false, None, false, None)
    }

    /// Replaces the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Sets the diagnostic handler tag.
    pub fn with_handler(mut self, handler: HandlerTag) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Whether access was granted.
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// The payload, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Consumes the response, returning the payload.
    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    /// Whether the payload's identity was anonymized.
    pub fn is_anon(&self) -> bool {
        self.is_anon
    }

    /// The alias shown in place of the real identity.
    pub fn anon_name(&self) -> Option<&str> {
        self.anon_name.as_deref()
    }

    /// Human-readable cause of the verdict.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The handler branch that produced the verdict.
    pub fn handler(&self) -> Option<HandlerTag> {
        self.handler
    }
}

impl fmt::Display for PrivacyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrivacyResponse[allowed={}, reason={}",
            self.allowed, self.reason
        )?;
        if let Some(handler) = &self.handler {
            write!(f, ", handler={}", handler)?;
        }
        if let Some(name) = &self.anon_name {
            write!(f, ", anon_name={}", name)?;
        }
        write!(f, "]")
    }
}
