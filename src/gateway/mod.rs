//! Persistence gateway boundary.
//!
//! Every read and write the policy engine performs goes through
//! [`PersistenceGateway`]. The engine never talks to storage directly, so a
//! test double such as [`MemoryGateway`] can stand in for the real store.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub use memory::MemoryGateway;

/// Identifier of a user.
pub type UserId = String;

/// Identifier of an event.
pub type EventId = String;

/// Public profile fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Real username
    pub username: String,
    /// Application role
    pub role: String,
    /// Free-text interests
    pub interest: Option<String>,
}

impl User {
    /// Creates a user with the given role and no interests.
    pub fn new(
        id: impl Into<UserId>,
        username: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role: role.into(),
            interest: None,
        }
    }

    /// Sets the user's interests.
    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.interest = Some(interest.into());
        self
    }
}

/// Who may see a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileVisibility {
    /// Everyone who is not blocked
    #[default]
    #[serde(rename = "public")]
    Public,
    /// Accepted friends only
    #[serde(rename = "friend_only", alias = "friends_only")]
    FriendsOnly,
    /// Nobody but the user
    #[serde(rename = "private")]
    Private,
}

/// A user's privacy preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    /// Owner of these settings
    pub user_id: UserId,
    /// Profile visibility tier
    #[serde(default)]
    pub profile_visibility: ProfileVisibility,
    /// Whether the user's identity is redacted for others
    #[serde(default)]
    pub is_anon: bool,
    /// Alias shown while anonymous
    #[serde(default)]
    pub anon_username: Option<String>,
}

impl PrivacySettings {
    /// Default settings: public, not anonymous, no alias.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            profile_visibility: ProfileVisibility::default(),
            is_anon: false,
            anon_username: None,
        }
    }

    /// Sets the visibility tier.
    pub fn with_visibility(mut self, visibility: ProfileVisibility) -> Self {
        self.profile_visibility = visibility;
        self
    }

    /// Marks the user anonymous under an optional alias.
    pub fn anonymous(mut self, alias: Option<&str>) -> Self {
        self.is_anon = true;
        self.anon_username = alias.map(str::to_string);
        self
    }

    /// Returns the alias, or `fallback` when none is set.
    pub fn alias_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.anon_username.as_deref().unwrap_or(fallback)
    }
}

/// State of a friendship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    /// Request sent, not yet answered
    Pending,
    /// Both users agreed
    Accepted,
    /// Request refused
    Declined,
}

/// The access-relevant fields of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// User who created the event
    pub creator_id: UserId,
    /// Whether anyone may see the event
    pub is_public: bool,
}

/// A user's attendance at an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    /// The attending user
    pub user: User,
    /// Whether the user attends anonymously
    pub is_anon: bool,
    /// Alias shown for anonymous attendance
    pub anon_username: Option<String>,
}

/// One event on a user's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Event identifier
    pub event_id: EventId,
    /// Event title
    pub title: String,
    /// Longer description
    pub description: Option<String>,
    /// Event category
    pub category: Option<String>,
    /// Start time
    pub start_date: DateTime<Utc>,
    /// End time
    pub end_date: DateTime<Utc>,
    /// Where the event takes place
    pub location: Option<String>,
    /// Whether anyone may see the event
    pub is_public: bool,
    /// User who created the event
    pub creator_id: UserId,
}

impl ScheduleEntry {
    /// Returns the access-relevant summary of this entry.
    pub fn event(&self) -> Event {
        Event {
            id: self.event_id.clone(),
            creator_id: self.creator_id.clone(),
            is_public: self.is_public,
        }
    }
}

/// Read/write access to users, settings, relationships, events and attendance.
///
/// Implementations report failures as [`GatewayError`]; the policy layer
/// decides how to degrade. Missing records are `Ok(None)` or `Ok(false)`,
/// never errors.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Looks up a user by id.
    async fn get_user(&self, id: &str) -> Result<Option<User>, GatewayError>;

    /// Looks up a user's privacy settings.
    async fn get_privacy_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<PrivacySettings>, GatewayError>;

    /// Inserts or replaces a user's privacy settings.
    async fn upsert_privacy_settings(
        &self,
        settings: PrivacySettings,
    ) -> Result<PrivacySettings, GatewayError>;

    /// True if `blocker_id` has blocked `blocked_id`. Directional.
    async fn is_blocked(&self, blocker_id: &str, blocked_id: &str) -> Result<bool, GatewayError>;

    /// True if a friendship with `status` exists between the users, in either direction.
    async fn are_friends(
        &self,
        a: &str,
        b: &str,
        status: FriendshipStatus,
    ) -> Result<bool, GatewayError>;

    /// Looks up an event by id.
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, GatewayError>;

    /// Lists the attendance records of an event.
    async fn get_attendees(&self, event_id: &str) -> Result<Vec<Attendance>, GatewayError>;

    /// True if the user attends the event.
    async fn is_attendee(&self, user_id: &str, event_id: &str) -> Result<bool, GatewayError>;

    /// Lists the events a user attends, ordered by start time ascending.
    async fn get_user_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, GatewayError>;
}
