use async_trait::async_trait;

use super::PolicyHandler;
use crate::action::Action;
use crate::gateway::ProfileVisibility;
use crate::request::PrivacyRequest;
use crate::response::{Branch, HandlerTag, PrivacyResponse};
use crate::service::{to_payload, PrivacyService};

/// Decides who may view a user's profile.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. the requester is the target: allowed, raw data
/// 2. a block exists in either direction: denied
/// 3. the target has no privacy settings: denied, not found
/// 4. the target is anonymous: allowed, username replaced by the alias
/// 5. public profile: allowed
/// 6. friends-only profile: allowed for accepted friends, denied otherwise
/// 7. private profile: denied
///
/// Denials that concern an existing profile carry a placeholder payload
/// rather than no payload.
#[derive(Clone)]
pub struct ViewProfileHandler {
    privacy: PrivacyService,
}

impl ViewProfileHandler {
    /// Creates the handler on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self { privacy }
    }

    fn tag(branch: Branch) -> HandlerTag {
        HandlerTag::new(Action::ViewProfile, branch)
    }

    async fn self_view(&self, user_id: &str) -> PrivacyResponse {
        let data = self
            .privacy
            .user(user_id)
            .await
            .map(|user| to_payload(&user))
            .unwrap_or_default();
        PrivacyResponse::success(data).with_handler(Self::tag(Branch::SelfAccess))
    }

    async fn real_profile(&self, target: &str, branch: Branch) -> PrivacyResponse {
        match self.privacy.user(target).await {
            Some(user) => {
                PrivacyResponse::success(to_payload(&user)).with_handler(Self::tag(branch))
            }
            None => not_found(),
        }
    }
}

fn not_found() -> PrivacyResponse {
    PrivacyResponse::failure("User not found")
        .with_handler(ViewProfileHandler::tag(Branch::NotFound))
}

#[async_trait]
impl PolicyHandler for ViewProfileHandler {
    fn action(&self) -> Action {
        Action::ViewProfile
    }

    async fn process_user_levels(&self, request: &PrivacyRequest) -> PrivacyResponse {
        let requester = request.requester_id();
        let Some(target) = request.target_id() else {
            return PrivacyResponse::failure("Target user ID not provided")
                .with_handler(Self::tag(Branch::NoTarget));
        };

        if request.is_self_request() {
            return self.self_view(target).await;
        }

        if self.privacy.is_blocked_either_way(requester, target).await {
            return PrivacyResponse::failure("Access blocked")
                .with_handler(Self::tag(Branch::Blocked));
        }

        let Some(settings) = self.privacy.privacy_settings(target).await else {
            return not_found();
        };

        if settings.is_anon {
            let alias = settings.alias_or(&self.privacy.config().anonymous_name);
            return match self.privacy.user(target).await {
                Some(user) => PrivacyResponse::anonymous(
                    self.privacy.anonymized_profile(&user, alias),
                    alias,
                )
                .with_handler(Self::tag(Branch::Anonymous)),
                None => not_found(),
            };
        }

        match settings.profile_visibility {
            ProfileVisibility::Public => self.real_profile(target, Branch::Public).await,
            ProfileVisibility::FriendsOnly => {
                if self.privacy.are_friends(requester, target).await {
                    self.real_profile(target, Branch::Friends).await
                } else {
                    PrivacyResponse::denied_with(
                        self.privacy.private_placeholder(target),
                        "Access denied",
                    )
                    .with_handler(Self::tag(Branch::Default))
                }
            }
            ProfileVisibility::Private => PrivacyResponse::denied_with(
                self.privacy.private_placeholder(target),
                "Profile is private",
            )
            .with_handler(Self::tag(Branch::Private)),
        }
    }
}
