use std::fmt;
use std::sync::Arc;

use super::{
    PolicyHandler, ViewAttendeesHandler, ViewCarpoolHandler, ViewProfileHandler,
    ViewScheduleHandler,
};
use crate::action::Action;
use crate::config::PrivacyConfig;
use crate::error::Error;
use crate::gateway::PersistenceGateway;
use crate::request::PrivacyRequest;
use crate::response::PrivacyResponse;
use crate::service::PrivacyService;

/// An ordered, immutable sequence of handlers.
///
/// Handlers are tried strictly in the order they were linked. The first one
/// that claims the request decides it; when none does, the chain answers
/// with [`PrivacyResponse::default_deny`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use privacy_policy::{HandlerChain, PrivacyConfig, PrivacyService};
/// use privacy_policy::handler::{ViewProfileHandler, ViewScheduleHandler};
/// use privacy_policy::gateway::MemoryGateway;
///
/// let privacy = PrivacyService::new(Arc::new(MemoryGateway::new()), PrivacyConfig::default());
/// let chain = HandlerChain::new()
///     .link(ViewProfileHandler::new(privacy.clone()))
///     .link(ViewScheduleHandler::new(privacy));
///
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn PolicyHandler>>,
}

impl HandlerChain {
    /// Creates an empty chain. An empty chain denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler after the current tail.
    pub fn link(self, handler: impl PolicyHandler + 'static) -> Self {
        self.link_boxed(Box::new(handler))
    }

    /// Appends an already boxed handler after the current tail.
    pub fn link_boxed(mut self, handler: Box<dyn PolicyHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The actions of the linked handlers, in chain order.
    pub fn actions(&self) -> Vec<Action> {
        self.handlers.iter().map(|h| h.action()).collect()
    }

    /// Walks the chain until a handler claims the request.
    pub async fn handle(&self, request: &PrivacyRequest) -> PrivacyResponse {
        for handler in &self.handlers {
            if let Some(response) = handler.process(request).await.into_response() {
                return response;
            }
        }
        tracing::debug!(
            action = %request.action(),
            requester = request.requester_id(),
            "no handler claimed the request"
        );
        PrivacyResponse::default_deny()
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("actions", &self.actions())
            .finish()
    }
}

/// Builds the handler owning `action`.
pub fn handler_for_action(
    action: Action,
    gateway: Arc<dyn PersistenceGateway>,
    config: &PrivacyConfig,
) -> Box<dyn PolicyHandler> {
    let privacy = PrivacyService::new(gateway, config.clone());
    match action {
        Action::ViewProfile => Box::new(ViewProfileHandler::new(privacy)),
        Action::ViewAttendees => Box::new(ViewAttendeesHandler::new(privacy)),
        Action::ViewCarpool => Box::new(ViewCarpoolHandler::new(privacy)),
        Action::ViewSchedule => Box::new(ViewScheduleHandler::new(privacy)),
    }
}

/// Builds the standard chain: profile, attendees, carpool, schedule.
///
/// Every call returns a chain with its own handler instances.
pub fn create_handler_chain(
    gateway: Arc<dyn PersistenceGateway>,
    config: &PrivacyConfig,
) -> HandlerChain {
    Action::ALL
        .into_iter()
        .fold(HandlerChain::new(), |chain, action| {
            chain.link_boxed(handler_for_action(action, gateway.clone(), config))
        })
}

/// Builds the handler for a raw action tag, bypassing the chain.
///
/// # Errors
///
/// Returns [`Error::UnknownAction`] carrying the literal tag (or `<none>`)
/// when no handler owns it.
pub fn create_specific_handler(
    action: Option<&str>,
    gateway: Arc<dyn PersistenceGateway>,
    config: &PrivacyConfig,
) -> Result<Box<dyn PolicyHandler>, Error> {
    let action = Action::parse_tag(action)?;
    Ok(handler_for_action(action, gateway, config))
}
