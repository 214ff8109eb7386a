use async_trait::async_trait;

use super::PolicyHandler;
use crate::action::Action;
use crate::request::PrivacyRequest;
use crate::response::{Branch, HandlerTag, PrivacyResponse};
use crate::service::{to_payload, CarpoolService, PrivacyService};

/// Decides who may see an event's carpool roster.
///
/// Eligibility follows the attendee ladder: creator, public event, attendee.
/// The roster itself never names an anonymous user, whoever is looking.
#[derive(Clone)]
pub struct ViewCarpoolHandler {
    carpool: CarpoolService,
}

impl ViewCarpoolHandler {
    /// Creates the handler on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self {
            carpool: CarpoolService::new(privacy),
        }
    }

    fn tag(branch: Branch) -> HandlerTag {
        HandlerTag::new(Action::ViewCarpool, branch)
    }
}

#[async_trait]
impl PolicyHandler for ViewCarpoolHandler {
    fn action(&self) -> Action {
        Action::ViewCarpool
    }

    async fn process_user_levels(&self, request: &PrivacyRequest) -> PrivacyResponse {
        let Some(event_id) = request.event_id() else {
            return PrivacyResponse::failure("Event ID not provided")
                .with_handler(Self::tag(Branch::NoEvent));
        };
        let Some(event) = self.carpool.event(&event_id).await else {
            return PrivacyResponse::failure("Event not found")
                .with_handler(Self::tag(Branch::EventNotFound));
        };

        let requester = request.requester_id();
        if !self.carpool.can_view_event_participants(requester, &event).await {
            return PrivacyResponse::failure("Access denied")
                .with_handler(Self::tag(Branch::Denied));
        }

        let candidates = self.carpool.participants(&event.id).await;
        let participants = self.carpool.filter_participants(requester, candidates).await;

        let branch = if requester == event.creator_id {
            Branch::Owner
        } else if event.is_public {
            Branch::Public
        } else {
            Branch::Attendee
        };
        PrivacyResponse::success(to_payload(&participants)).with_handler(Self::tag(branch))
    }
}
