use std::fmt;
use std::sync::Arc;

use crate::audit::{self, AuditEvent, AuditTrail};
use crate::config::PrivacyConfig;
use crate::error::Error;
use crate::gateway::PersistenceGateway;
use crate::handler::{create_handler_chain, create_specific_handler, HandlerChain, PolicyHandler};
use crate::request::PrivacyRequest;
use crate::response::PrivacyResponse;
use crate::service::PrivacyService;

/// Entry point of the engine.
///
/// Owns the standard handler chain over one persistence gateway. The chain is
/// built once and never mutated, so a single `Authorizer` can serve
/// concurrent requests from behind an `Arc`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use privacy_policy::{Action, Authorizer, PrivacyConfig, PrivacyRequest};
/// use privacy_policy::gateway::{MemoryGateway, PrivacySettings, User};
///
/// # block_on(async {
/// let gateway = Arc::new(MemoryGateway::new());
/// gateway.add_user(User::new("u2", "bob", "student")).await;
/// gateway.set_privacy_settings(PrivacySettings::new("u2")).await;
///
/// let authorizer = Authorizer::new(gateway, PrivacyConfig::default());
/// let response = authorizer
///     .authorize(&PrivacyRequest::targeting("u1", "u2", Action::ViewProfile))
///     .await;
///
/// assert!(response.allowed());
/// assert_eq!(response.handler().unwrap().to_string(), "ViewProfileHandler-Public");
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Authorizer {
    chain: HandlerChain,
    privacy: PrivacyService,
    gateway: Arc<dyn PersistenceGateway>,
    trail: Option<Arc<AuditTrail>>,
}

impl Authorizer {
    /// Builds the standard chain over `gateway`.
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: PrivacyConfig) -> Self {
        let chain = create_handler_chain(gateway.clone(), &config);
        Self {
            chain,
            privacy: PrivacyService::new(gateway.clone(), config),
            gateway,
            trail: None,
        }
    }

    /// Records every decision into `trail` as well as emitting it.
    pub fn with_audit_trail(mut self, trail: Arc<AuditTrail>) -> Self {
        self.trail = Some(trail);
        self
    }

    /// The chain requests are dispatched through.
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Shared privacy rules and settings management.
    pub fn privacy(&self) -> &PrivacyService {
        &self.privacy
    }

    /// The configuration handlers were built with.
    pub fn config(&self) -> &PrivacyConfig {
        self.privacy.config()
    }

    /// Decides `request`.
    ///
    /// Never fails: unclaimed actions get the default deny, and gateway
    /// faults degrade into denials or empty listings.
    pub async fn authorize(&self, request: &PrivacyRequest) -> PrivacyResponse {
        let response = self.chain.handle(request).await;
        tracing::debug!(
            requester = request.requester_id(),
            target = ?request.target_id(),
            action = %request.action(),
            allowed = response.allowed(),
            handler = ?response.handler().map(|tag| tag.to_string()),
            "privacy decision"
        );

        if self.config().audit_decisions {
            let event = AuditEvent::from_decision(request, &response);
            match &self.trail {
                Some(trail) => audit::emit_and_record(event, trail),
                None => audit::emit(&event),
            }
        }
        response
    }

    /// Builds the handler for an action tag, bypassing the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] when no handler owns `action`.
    pub fn handler_for(&self, action: Option<&str>) -> Result<Box<dyn PolicyHandler>, Error> {
        create_specific_handler(action, self.gateway.clone(), self.config())
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("chain", &self.chain)
            .field("config", self.config())
            .field("audit_trail", &self.trail.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::audit::AuditOutcome;
    use crate::gateway::{MemoryGateway, PrivacySettings, User};
    use crate::response::Branch;
    use crate::service::SettingsUpdate;

    async fn authorizer(
        config: PrivacyConfig,
    ) -> (Arc<MemoryGateway>, Authorizer, Arc<AuditTrail>) {
        let gateway = Arc::new(MemoryGateway::new());
        for (id, name) in [("u1", "alice"), ("u2", "bob")] {
            gateway.add_user(User::new(id, name, "student")).await;
            gateway.set_privacy_settings(PrivacySettings::new(id)).await;
        }
        let trail = Arc::new(AuditTrail::new());
        let authorizer = Authorizer::new(gateway.clone(), config).with_audit_trail(trail.clone());
        (gateway, authorizer, trail)
    }

    #[tokio::test]
    async fn decisions_are_audited() {
        let (gateway, authorizer, trail) = authorizer(PrivacyConfig::default()).await;
        gateway.block("u2", "u1").await;

        let response = authorizer
            .authorize(&PrivacyRequest::targeting("u1", "u2", Action::ViewProfile))
            .await;
        assert_eq!(response.reason(), "Access blocked");

        let events = trail.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome(), AuditOutcome::Denied);
        assert_eq!(events[0].handler().unwrap().branch(), Branch::Blocked);
        assert_eq!(events[0].target(), Some("u2"));
    }

    #[tokio::test]
    async fn auditing_can_be_switched_off() {
        let config = PrivacyConfig {
            audit_decisions: false,
            ..PrivacyConfig::default()
        };
        let (_, authorizer, trail) = authorizer(config).await;

        authorizer
            .authorize(&PrivacyRequest::targeting("u1", "u1", Action::ViewProfile))
            .await;
        assert!(trail.is_empty());
    }

    #[tokio::test]
    async fn settings_updates_take_effect_immediately() {
        let (_, authorizer, _) = authorizer(PrivacyConfig::default()).await;
        let request = PrivacyRequest::targeting("u1", "u2", Action::ViewSchedule);
        assert!(authorizer.authorize(&request).await.allowed());

        authorizer
            .privacy()
            .update_settings(
                "u2",
                SettingsUpdate {
                    is_anon: true,
                    anon_username: Some("Quiet".to_string()),
                    profile_visibility: None,
                },
            )
            .await
            .unwrap();
        assert!(!authorizer.authorize(&request).await.allowed());
    }

    #[test]
    fn handler_lookup() {
        let gateway = Arc::new(MemoryGateway::new());
        let authorizer = Authorizer::new(gateway, PrivacyConfig::default());

        let handler = authorizer.handler_for(Some("view_attendees")).unwrap();
        assert_eq!(handler.action(), Action::ViewAttendees);

        let err = authorizer.handler_for(Some("ViewProfile")).err().unwrap();
        assert!(matches!(err, Error::UnknownAction(ref tag) if tag == "ViewProfile"));
    }

    #[test]
    fn debug_output() {
        let authorizer = Authorizer::new(Arc::new(MemoryGateway::new()), PrivacyConfig::default());
        let debug = format!("{:?}", authorizer);
        assert!(debug.contains("ViewProfile"));
        assert!(debug.contains("audit_trail: false"));
    }
}
