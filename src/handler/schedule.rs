use async_trait::async_trait;

use super::PolicyHandler;
use crate::action::Action;
use crate::request::PrivacyRequest;
use crate::response::{Branch, HandlerTag, PrivacyResponse};
use crate::service::{to_payload, PrivacyService, ScheduleService};

/// Decides who may see a user's personal schedule.
///
/// Only the owner sees an anonymous user's schedule. Everyone else sees the
/// events the target attends that are public or that they created themselves.
#[derive(Clone)]
pub struct ViewScheduleHandler {
    schedules: ScheduleService,
}

impl ViewScheduleHandler {
    /// Creates the handler on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self {
            schedules: ScheduleService::new(privacy),
        }
    }

    fn tag(branch: Branch) -> HandlerTag {
        HandlerTag::new(Action::ViewSchedule, branch)
    }
}

#[async_trait]
impl PolicyHandler for ViewScheduleHandler {
    fn action(&self) -> Action {
        Action::ViewSchedule
    }

    async fn process_user_levels(&self, request: &PrivacyRequest) -> PrivacyResponse {
        let requester = request.requester_id();
        let Some(target) = request.target_id() else {
            return PrivacyResponse::failure("Target user ID not provided")
                .with_handler(Self::tag(Branch::NoTarget));
        };

        if !self.schedules.can_view_schedule(requester, target).await {
            return PrivacyResponse::failure("Schedule is private")
                .with_handler(Self::tag(Branch::Private));
        }

        let schedule = self.schedules.user_schedule(target).await;
        let visible = self.schedules.filter_schedule(requester, schedule);

        let branch = if request.is_self_request() {
            Branch::SelfAccess
        } else {
            Branch::Other
        };
        PrivacyResponse::success(to_payload(&visible)).with_handler(Self::tag(branch))
    }
}
