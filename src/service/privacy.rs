use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::or_safe_default;
use crate::config::PrivacyConfig;
use crate::error::Error;
use crate::gateway::{
    Attendance, Event, FriendshipStatus, PersistenceGateway, PrivacySettings, ProfileVisibility,
    User, UserId,
};

/// A requested change to a user's privacy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    /// Whether the user wants to be anonymous
    pub is_anon: bool,
    /// Alias to show while anonymous; required when `is_anon` is set
    #[serde(default)]
    pub anon_username: Option<String>,
    /// New visibility tier; unchanged when absent
    #[serde(default)]
    pub profile_visibility: Option<ProfileVisibility>,
}

/// How an attendee appears in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttendeeIdentity {
    /// The attendee's real profile
    Visible(User),
    /// Only the id and an alias
    Anonymous {
        /// User id
        id: UserId,
        /// Alias in place of the real username
        username: String,
        /// Always `true`
        #[serde(rename = "isAnon")]
        is_anon: bool,
    },
}

/// One entry of an attendee listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeView {
    /// Identity shown for this attendee
    pub user: AttendeeIdentity,
}

/// Blocking, friendship and anonymity rules shared by every handler.
#[derive(Clone)]
pub struct PrivacyService {
    gateway: Arc<dyn PersistenceGateway>,
    config: PrivacyConfig,
}

impl PrivacyService {
    /// Creates a service reading through `gateway`.
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: PrivacyConfig) -> Self {
        Self { gateway, config }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PrivacyConfig {
        &self.config
    }

    /// Looks up a user's profile. `None` when absent or unreadable.
    pub async fn user(&self, user_id: &str) -> Option<User> {
        or_safe_default(self.gateway.get_user(user_id).await, None)
    }

    /// Looks up a user's settings. `None` when absent or unreadable.
    pub async fn privacy_settings(&self, user_id: &str) -> Option<PrivacySettings> {
        or_safe_default(self.gateway.get_privacy_settings(user_id).await, None)
    }

    /// Looks up an event. `None` when absent or unreadable.
    pub async fn event(&self, event_id: &str) -> Option<Event> {
        or_safe_default(self.gateway.get_event(event_id).await, None)
    }

    /// True if the user attends the event. Fails closed.
    pub async fn is_attendee(&self, user_id: &str, event_id: &str) -> bool {
        or_safe_default(self.gateway.is_attendee(user_id, event_id).await, false)
    }

    /// Attendance records of an event. Empty when unreadable.
    pub async fn attendees(&self, event_id: &str) -> Vec<Attendance> {
        or_safe_default(self.gateway.get_attendees(event_id).await, Vec::new())
    }

    /// Stores default settings for a user: public, not anonymous, no alias.
    pub async fn create_default_settings(&self, user_id: &str) -> Result<PrivacySettings, Error> {
        let settings = self
            .gateway
            .upsert_privacy_settings(PrivacySettings::new(user_id))
            .await?;
        tracing::info!(user = user_id, "created default privacy settings");
        Ok(settings)
    }

    /// Applies an update to a user's settings, creating them if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] when anonymity is requested without a
    /// non-blank alias, and [`Error::Gateway`] when the store fails.
    pub async fn update_settings(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<PrivacySettings, Error> {
        let alias = update
            .anon_username
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);
        if update.is_anon && alias.is_none() {
            return Err(Error::InvalidSettings(
                "anonymous username is required when isAnon is true".to_string(),
            ));
        }

        let mut settings = self
            .gateway
            .get_privacy_settings(user_id)
            .await?
            .unwrap_or_else(|| PrivacySettings::new(user_id));
        settings.is_anon = update.is_anon;
        settings.anon_username = alias;
        if let Some(visibility) = update.profile_visibility {
            settings.profile_visibility = visibility;
        }

        let stored = self.gateway.upsert_privacy_settings(settings).await?;
        tracing::info!(
            user = user_id,
            is_anon = stored.is_anon,
            visibility = ?stored.profile_visibility,
            "updated privacy settings"
        );
        Ok(stored)
    }

    /// True if either user has blocked the other.
    ///
    /// Fails closed: an unreadable block table counts as blocked.
    pub async fn is_blocked_either_way(&self, a: &str, b: &str) -> bool {
        let a_blocked_b = or_safe_default(self.gateway.is_blocked(a, b).await, true);
        if a_blocked_b {
            return true;
        }
        or_safe_default(self.gateway.is_blocked(b, a).await, true)
    }

    /// True if the users are accepted friends, in either direction.
    pub async fn are_friends(&self, a: &str, b: &str) -> bool {
        or_safe_default(
            self.gateway.are_friends(a, b, FriendshipStatus::Accepted).await,
            false,
        )
    }

    /// True if the user has chosen anonymity.
    ///
    /// Fails closed: unreadable settings count as anonymous so that identity
    /// stays redacted.
    pub async fn is_user_anonymous(&self, user_id: &str) -> bool {
        match self.gateway.get_privacy_settings(user_id).await {
            Ok(settings) => settings.is_some_and(|s| s.is_anon),
            Err(err) => or_safe_default(Err(err), true),
        }
    }

    /// Returns the user's alias, if one is set.
    pub async fn anonymous_username(&self, user_id: &str) -> Option<String> {
        self.privacy_settings(user_id)
            .await
            .and_then(|settings| settings.anon_username)
    }

    /// The name others should see for this user.
    pub async fn display_name(&self, user_id: &str) -> String {
        match self.gateway.get_privacy_settings(user_id).await {
            Ok(Some(settings)) if settings.is_anon => {
                return settings.alias_or(&self.config.anonymous_name).to_string();
            }
            Ok(_) => {}
            Err(err) => return or_safe_default(Err(err), self.config.unknown_name.clone()),
        }
        self.user(user_id)
            .await
            .map(|user| user.username)
            .unwrap_or_else(|| self.config.unknown_name.clone())
    }

    /// True if `viewer` may see `target`'s identity: self, or a target whose
    /// settings exist and are not anonymous.
    pub async fn can_view_profile(&self, viewer: &str, target: &str) -> bool {
        if viewer == target {
            return true;
        }
        self.privacy_settings(target)
            .await
            .is_some_and(|settings| !settings.is_anon)
    }

    /// The payload shown in place of a profile the viewer may not see.
    pub fn private_placeholder(&self, user_id: &str) -> Value {
        json!({
            "id": user_id,
            "username": self.config.private_name,
            "isPrivate": true,
        })
    }

    /// A profile with the username replaced by the alias.
    pub fn anonymized_profile(&self, user: &User, alias: &str) -> Value {
        json!({
            "id": user.id,
            "username": alias,
            "role": user.role,
            "interest": user.interest,
            "isAnon": true,
        })
    }

    /// Reduces a profile to what `viewer` may see of it.
    pub async fn filter_user_data(&self, viewer: &str, user: &User) -> Value {
        if !self.can_view_profile(viewer, &user.id).await {
            return self.private_placeholder(&user.id);
        }
        match self.privacy_settings(&user.id).await {
            Some(settings) if settings.is_anon && viewer != user.id => {
                self.anonymized_profile(user, settings.alias_or(&self.config.anonymous_name))
            }
            _ => json!({
                "id": user.id,
                "username": user.username,
                "role": user.role,
                "interest": user.interest,
                "isAnon": false,
            }),
        }
    }

    /// Rewrites anonymous attendees to id + alias.
    ///
    /// An attendee is anonymous when the attendance is marked anonymous or the
    /// user's settings are. The alias comes from the attendance, then the
    /// settings, then the configured fallback. Unreadable settings count as
    /// anonymous.
    pub async fn anonymize_attendees(&self, attendees: Vec<Attendance>) -> Vec<AttendeeView> {
        let mut views = Vec::with_capacity(attendees.len());
        for attendance in attendees {
            let (settings_anon, settings_alias) =
                match self.gateway.get_privacy_settings(&attendance.user.id).await {
                    Ok(Some(settings)) => (settings.is_anon, settings.anon_username),
                    Ok(None) => (false, None),
                    Err(err) => (or_safe_default(Err(err), true), None),
                };

            let user = if attendance.is_anon || settings_anon {
                let username = attendance
                    .anon_username
                    .or(settings_alias)
                    .unwrap_or_else(|| self.config.anonymous_name.clone());
                AttendeeIdentity::Anonymous {
                    id: attendance.user.id,
                    username,
                    is_anon: true,
                }
            } else {
                AttendeeIdentity::Visible(attendance.user)
            };
            views.push(AttendeeView { user });
        }
        views
    }

    /// Keeps attendees the viewer may see, aliasing those with anonymous settings.
    pub async fn filter_attendees(
        &self,
        viewer: &str,
        attendees: Vec<Attendance>,
    ) -> Vec<AttendeeView> {
        let mut visible = Vec::with_capacity(attendees.len());
        for attendance in attendees {
            if !self.can_view_profile(viewer, &attendance.user.id).await {
                continue;
            }
            let settings = self.privacy_settings(&attendance.user.id).await;
            let user = match settings {
                Some(settings) if settings.is_anon => AttendeeIdentity::Anonymous {
                    id: attendance.user.id.clone(),
                    username: settings.alias_or(&self.config.anonymous_name).to_string(),
                    is_anon: true,
                },
                _ => AttendeeIdentity::Visible(attendance.user),
            };
            visible.push(AttendeeView { user });
        }
        visible
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }
}
