use async_trait::async_trait;

use super::PolicyHandler;
use crate::action::Action;
use crate::request::PrivacyRequest;
use crate::response::{Branch, HandlerTag, PrivacyResponse};
use crate::service::{to_payload, PrivacyService};

/// Decides who may list an event's attendees.
///
/// The creator, anyone for a public event, and attendees of a private event
/// may list attendees. Anonymous attendees appear only as id and alias.
#[derive(Clone)]
pub struct ViewAttendeesHandler {
    privacy: PrivacyService,
}

impl ViewAttendeesHandler {
    /// Creates the handler on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self { privacy }
    }

    fn tag(branch: Branch) -> HandlerTag {
        HandlerTag::new(Action::ViewAttendees, branch)
    }

    async fn attendee_list(&self, event_id: &str, branch: Branch) -> PrivacyResponse {
        let attendees = self.privacy.attendees(event_id).await;
        let views = self.privacy.anonymize_attendees(attendees).await;
        PrivacyResponse::success(to_payload(&views)).with_handler(Self::tag(branch))
    }
}

#[async_trait]
impl PolicyHandler for ViewAttendeesHandler {
    fn action(&self) -> Action {
        Action::ViewAttendees
    }

    async fn process_user_levels(&self, request: &PrivacyRequest) -> PrivacyResponse {
        let Some(event_id) = request.event_id() else {
            return PrivacyResponse::failure("Event ID not provided")
                .with_handler(Self::tag(Branch::NoEvent));
        };
        let Some(event) = self.privacy.event(&event_id).await else {
            return PrivacyResponse::failure("Event not found")
                .with_handler(Self::tag(Branch::EventNotFound));
        };

        let requester = request.requester_id();
        if requester == event.creator_id {
            return self.attendee_list(&event.id, Branch::Owner).await;
        }
        if event.is_public {
            return self.attendee_list(&event.id, Branch::Public).await;
        }
        if self.privacy.is_attendee(requester, &event.id).await {
            return self.attendee_list(&event.id, Branch::Attendee).await;
        }

        PrivacyResponse::failure("Access denied").with_handler(Self::tag(Branch::Default))
    }
}
