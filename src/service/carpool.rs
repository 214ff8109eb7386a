use serde::Serialize;

use super::PrivacyService;
use crate::gateway::{Event, UserId};

/// A user offered for carpool matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolParticipant {
    /// User id
    pub user_id: UserId,
    /// Real username; anonymous users are never participants
    pub username: String,
    /// Application role
    pub role: String,
}

/// Carpool eligibility and roster filtering.
///
/// Anonymous users never take part in carpool matching, whoever is looking.
#[derive(Clone)]
pub struct CarpoolService {
    privacy: PrivacyService,
}

impl CarpoolService {
    /// Creates a carpool service on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self { privacy }
    }

    /// Looks up an event. `None` when absent or unreadable.
    pub async fn event(&self, event_id: &str) -> Option<Event> {
        self.privacy.event(event_id).await
    }

    /// True if `viewer` may see who is carpooling to the event: its creator,
    /// anyone for a public event, or an attendee of a private one.
    pub async fn can_view_participants(&self, viewer: &str, event_id: &str) -> bool {
        match self.event(event_id).await {
            Some(event) => self.can_view_event_participants(viewer, &event).await,
            None => false,
        }
    }

    pub(crate) async fn can_view_event_participants(&self, viewer: &str, event: &Event) -> bool {
        if viewer == event.creator_id || event.is_public {
            return true;
        }
        self.privacy.is_attendee(viewer, &event.id).await
    }

    /// Attendees of the event who are eligible for carpooling.
    ///
    /// Anyone anonymous, whether by their settings or by this attendance,
    /// is left out, as is anyone whose settings cannot be read.
    pub async fn participants(&self, event_id: &str) -> Vec<CarpoolParticipant> {
        let attendees = self.privacy.attendees(event_id).await;

        let mut participants = Vec::with_capacity(attendees.len());
        for attendance in attendees {
            if attendance.is_anon {
                continue;
            }
            if self.privacy.is_user_anonymous(&attendance.user.id).await {
                continue;
            }
            participants.push(CarpoolParticipant {
                user_id: attendance.user.id,
                username: attendance.user.username,
                role: attendance.user.role,
            });
        }
        participants
    }

    /// Keeps the participants whose profile `viewer` may see and who are not
    /// anonymous.
    pub async fn filter_participants(
        &self,
        viewer: &str,
        participants: Vec<CarpoolParticipant>,
    ) -> Vec<CarpoolParticipant> {
        let mut visible = Vec::with_capacity(participants.len());
        for participant in participants {
            if !self.can_view_participant_profile(viewer, &participant.user_id).await {
                continue;
            }
            if self.privacy.is_user_anonymous(&participant.user_id).await {
                continue;
            }
            visible.push(participant);
        }
        visible
    }

    /// True if `viewer` may see the participant: self, or a participant with
    /// readable, non-anonymous settings.
    pub async fn can_view_participant_profile(&self, viewer: &str, participant: &str) -> bool {
        self.privacy.can_view_profile(viewer, participant).await
    }

    /// The name shown for a user in carpool listings.
    pub async fn display_name(&self, user_id: &str) -> String {
        self.privacy.display_name(user_id).await
    }
}
