//! Policy handlers and the chain that dispatches to them.
//!
//! Each handler owns exactly one [`Action`]. A handler *claims* a request by
//! matching its action, independent of whether its verdict allows access;
//! once a handler claims a request no later handler is consulted.

mod attendees;
mod carpool;
mod chain;
mod profile;
mod schedule;

use async_trait::async_trait;

use crate::action::Action;
use crate::request::PrivacyRequest;
use crate::response::{Branch, HandlerTag, PrivacyResponse};

pub use attendees::ViewAttendeesHandler;
pub use carpool::ViewCarpoolHandler;
pub use chain::{create_handler_chain, create_specific_handler, handler_for_action, HandlerChain};
pub use profile::ViewProfileHandler;
pub use schedule::ViewScheduleHandler;

/// Outcome of offering a request to a single handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// The handler does not own the request's action
    Unhandled,
    /// The handler owns the action and rendered a verdict
    Handled(PrivacyResponse),
}

impl HandlerResult {
    /// True if the handler claimed the request.
    pub fn is_handled(&self) -> bool {
        matches!(self, HandlerResult::Handled(_))
    }

    /// Returns the verdict, if the handler claimed the request.
    pub fn response(&self) -> Option<&PrivacyResponse> {
        match self {
            HandlerResult::Handled(response) => Some(response),
            HandlerResult::Unhandled => None,
        }
    }

    /// Consumes the result, returning the verdict if any.
    pub fn into_response(self) -> Option<PrivacyResponse> {
        match self {
            HandlerResult::Handled(response) => Some(response),
            HandlerResult::Unhandled => None,
        }
    }
}

/// A policy component owning the authorization logic for one action.
///
/// Implementors provide [`action`](Self::action) and
/// [`process_user_levels`](Self::process_user_levels); matching and
/// dispatch come from the provided methods. Handlers hold no per-request
/// state and can be shared across concurrent requests.
#[async_trait]
pub trait PolicyHandler: Send + Sync {
    /// The action this handler owns.
    fn action(&self) -> Action;

    /// True if this handler owns the request's action.
    fn can_handle(&self, request: &PrivacyRequest) -> bool {
        request.action() == self.action()
    }

    /// Offers the request to this handler.
    ///
    /// Returns [`HandlerResult::Unhandled`] for foreign actions, otherwise
    /// the verdict of [`process_user_levels`](Self::process_user_levels).
    async fn process(&self, request: &PrivacyRequest) -> HandlerResult {
        if !self.can_handle(request) {
            return HandlerResult::Unhandled;
        }
        HandlerResult::Handled(self.process_user_levels(request).await)
    }

    /// Applies this action's visibility rules.
    ///
    /// The provided implementation is a loud, attributable failure so that an
    /// action without a policy never falls through silently.
    async fn process_user_levels(&self, _request: &PrivacyRequest) -> PrivacyResponse {
        let action = self.action();
        tracing::error!(action = %action, "handler claimed an action it has no policy for");
        PrivacyResponse::failure(format!("No policy implemented for {}", action))
            .with_handler(HandlerTag::new(action, Branch::NotImplemented))
    }

    /// Decides the request on its own, without a chain.
    ///
    /// Unclaimed requests receive [`PrivacyResponse::default_deny`].
    async fn handle(&self, request: &PrivacyRequest) -> PrivacyResponse {
        self.process(request)
            .await
            .into_response()
            .unwrap_or_else(PrivacyResponse::default_deny)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A handler with no policy of its own.
    pub(crate) struct BareHandler(pub(crate) Action);

    #[async_trait]
    impl PolicyHandler for BareHandler {
        fn action(&self) -> Action {
            self.0
        }
    }

    #[tokio::test]
    async fn foreign_action_is_unhandled() {
        let handler = BareHandler(Action::ViewProfile);
        let request = PrivacyRequest::new("u1", Action::ViewCarpool);

        let result = handler.process(&request).await;
        assert_eq!(result, HandlerResult::Unhandled);
        assert!(result.response().is_none());
    }

    #[tokio::test]
    async fn missing_policy_is_an_attributed_failure() {
        let handler = BareHandler(Action::ViewSchedule);
        let request = PrivacyRequest::new("u1", Action::ViewSchedule);

        let result = handler.process(&request).await;
        assert!(result.is_handled());
        let response = result.into_response().unwrap();
        assert!(!response.allowed());
        assert_eq!(
            response.handler().unwrap().to_string(),
            "ViewScheduleHandler-NotImplemented"
        );
        assert!(response.reason().contains("view_schedule"));
    }

    #[tokio::test]
    async fn standalone_handle_falls_back_to_default_deny() {
        let handler = BareHandler(Action::ViewProfile);
        let request = PrivacyRequest::new("u1", Action::ViewAttendees);

        assert_eq!(handler.handle(&request).await, PrivacyResponse::default_deny());
    }
}
