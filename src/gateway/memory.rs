//! In-memory persistence gateway.
//!
//! Holds users, settings, relationships, events and attendance in plain maps
//! behind a single async lock. Individual operations can be made to fail so
//! that fail-closed behavior is observable in tests and demos.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Attendance, Event, EventId, FriendshipStatus, PersistenceGateway, PrivacySettings,
    ScheduleEntry, User, UserId,
};
use crate::error::GatewayError;

#[derive(Debug, Clone)]
struct AttendanceRecord {
    user_id: UserId,
    is_anon: bool,
    anon_username: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    settings: HashMap<UserId, PrivacySettings>,
    blocks: HashSet<(UserId, UserId)>,
    friendships: HashMap<(UserId, UserId), FriendshipStatus>,
    events: HashMap<EventId, ScheduleEntry>,
    // Kept in insertion order so attendee listings are stable.
    attendance: HashMap<EventId, Vec<AttendanceRecord>>,
    failing: HashSet<&'static str>,
    fail_all: bool,
}

impl State {
    fn check(&self, operation: &'static str) -> Result<(), GatewayError> {
        if self.fail_all || self.failing.contains(operation) {
            return Err(GatewayError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn attends(&self, user_id: &str, event_id: &str) -> bool {
        self.attendance
            .get(event_id)
            .is_some_and(|records| records.iter().any(|r| r.user_id == user_id))
    }
}

/// A [`PersistenceGateway`] backed by in-process maps.
///
/// # Example
///
/// ```
/// use privacy_policy::gateway::{MemoryGateway, PersistenceGateway, User};
///
/// # block_on(async {
/// let gateway = MemoryGateway::new();
/// gateway.add_user(User::new("u1", "alice", "student")).await;
/// gateway.block("u1", "u2").await;
///
/// assert!(gateway.is_blocked("u1", "u2").await.unwrap());
/// assert!(!gateway.is_blocked("u2", "u1").await.unwrap());
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RwLock<State>,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub async fn add_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.users.insert(user.id.clone(), user);
    }

    /// Inserts or replaces a user's privacy settings.
    pub async fn set_privacy_settings(&self, settings: PrivacySettings) {
        let mut state = self.state.write().await;
        state.settings.insert(settings.user_id.clone(), settings);
    }

    /// Records that `blocker` blocked `blocked`.
    pub async fn block(&self, blocker: &str, blocked: &str) {
        let mut state = self.state.write().await;
        state.blocks.insert((blocker.to_string(), blocked.to_string()));
    }

    /// Records a friendship from `a` to `b` with the given status.
    pub async fn befriend(&self, a: &str, b: &str, status: FriendshipStatus) {
        let mut state = self.state.write().await;
        state
            .friendships
            .insert((a.to_string(), b.to_string()), status);
    }

    /// Inserts or replaces an event.
    pub async fn add_event(&self, event: ScheduleEntry) {
        let mut state = self.state.write().await;
        state.events.insert(event.event_id.clone(), event);
    }

    /// Records that a user attends an event under their own name.
    pub async fn attend(&self, user_id: &str, event_id: &str) {
        self.record_attendance(user_id, event_id, false, None).await;
    }

    /// Records that a user attends an event anonymously.
    pub async fn attend_anonymously(&self, user_id: &str, event_id: &str, alias: Option<&str>) {
        self.record_attendance(user_id, event_id, true, alias).await;
    }

    async fn record_attendance(
        &self,
        user_id: &str,
        event_id: &str,
        is_anon: bool,
        alias: Option<&str>,
    ) {
        let mut state = self.state.write().await;
        let records = state.attendance.entry(event_id.to_string()).or_default();
        records.retain(|r| r.user_id != user_id);
        records.push(AttendanceRecord {
            user_id: user_id.to_string(),
            is_anon,
            anon_username: alias.map(str::to_string),
        });
    }

    /// Makes every call to `operation` fail until [`heal`](Self::heal) is called.
    pub async fn fail_on(&self, operation: &'static str) {
        self.state.write().await.failing.insert(operation);
    }

    /// Makes every operation fail until [`heal`](Self::heal) is called.
    pub async fn fail_everything(&self) {
        self.state.write().await.fail_all = true;
    }

    /// Clears all injected failures.
    pub async fn heal(&self) {
        let mut state = self.state.write().await;
        state.failing.clear();
        state.fail_all = false;
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_user(&self, id: &str) -> Result<Option<User>, GatewayError> {
        let state = self.state.read().await;
        state.check("get_user")?;
        Ok(state.users.get(id).cloned())
    }

    async fn get_privacy_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<PrivacySettings>, GatewayError> {
        let state = self.state.read().await;
        state.check("get_privacy_settings")?;
        Ok(state.settings.get(user_id).cloned())
    }

    async fn upsert_privacy_settings(
        &self,
        settings: PrivacySettings,
    ) -> Result<PrivacySettings, GatewayError> {
        let mut state = self.state.write().await;
        state.check("upsert_privacy_settings")?;
        state
            .settings
            .insert(settings.user_id.clone(), settings.clone());
        Ok(settings)
    }

    async fn is_blocked(&self, blocker_id: &str, blocked_id: &str) -> Result<bool, GatewayError> {
        let state = self.state.read().await;
        state.check("is_blocked")?;
        Ok(state
            .blocks
            .contains(&(blocker_id.to_string(), blocked_id.to_string())))
    }

    async fn are_friends(
        &self,
        a: &str,
        b: &str,
        status: FriendshipStatus,
    ) -> Result<bool, GatewayError> {
        let state = self.state.read().await;
        state.check("are_friends")?;
        let forward = state.friendships.get(&(a.to_string(), b.to_string()));
        let backward = state.friendships.get(&(b.to_string(), a.to_string()));
        Ok(forward == Some(&status) || backward == Some(&status))
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, GatewayError> {
        let state = self.state.read().await;
        state.check("get_event")?;
        Ok(state.events.get(event_id).map(ScheduleEntry::event))
    }

    async fn get_attendees(&self, event_id: &str) -> Result<Vec<Attendance>, GatewayError> {
        let state = self.state.read().await;
        state.check("get_attendees")?;
        let Some(records) = state.attendance.get(event_id) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .filter_map(|record| {
                state.users.get(&record.user_id).map(|user| Attendance {
                    user: user.clone(),
                    is_anon: record.is_anon,
                    anon_username: record.anon_username.clone(),
                })
            })
            .collect())
    }

    async fn is_attendee(&self, user_id: &str, event_id: &str) -> Result<bool, GatewayError> {
        let state = self.state.read().await;
        state.check("is_attendee")?;
        Ok(state.attends(user_id, event_id))
    }

    async fn get_user_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, GatewayError> {
        let state = self.state.read().await;
        state.check("get_user_schedule")?;
        let mut schedule: Vec<ScheduleEntry> = state
            .events
            .values()
            .filter(|event| state.attends(user_id, &event.event_id))
            .cloned()
            .collect();
        schedule.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: &str, creator: &str, day: u32, is_public: bool) -> ScheduleEntry {
        let start = Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap();
        ScheduleEntry {
            event_id: id.to_string(),
            title: format!("event {id}"),
            description: None,
            category: None,
            start_date: start,
            end_date: start + chrono::Duration::hours(2),
            location: None,
            is_public,
            creator_id: creator.to_string(),
        }
    }

    #[tokio::test]
    async fn blocks_are_directional() {
        let gateway = MemoryGateway::new();
        gateway.block("a", "b").await;

        assert!(gateway.is_blocked("a", "b").await.unwrap());
        assert!(!gateway.is_blocked("b", "a").await.unwrap());
    }

    #[tokio::test]
    async fn friendships_match_either_direction_and_status() {
        let gateway = MemoryGateway::new();
        gateway.befriend("a", "b", FriendshipStatus::Accepted).await;
        gateway.befriend("c", "a", FriendshipStatus::Pending).await;

        assert!(gateway.are_friends("b", "a", FriendshipStatus::Accepted).await.unwrap());
        assert!(!gateway.are_friends("a", "c", FriendshipStatus::Accepted).await.unwrap());
        assert!(gateway.are_friends("a", "c", FriendshipStatus::Pending).await.unwrap());
    }

    #[tokio::test]
    async fn schedule_is_sorted_by_start() {
        let gateway = MemoryGateway::new();
        gateway.add_user(User::new("u1", "alice", "student")).await;
        gateway.add_event(entry("late", "x", 20, true)).await;
        gateway.add_event(entry("early", "x", 2, true)).await;
        gateway.add_event(entry("other", "x", 10, true)).await;
        gateway.attend("u1", "late").await;
        gateway.attend("u1", "early").await;

        let ids: Vec<_> = gateway
            .get_user_schedule("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_id)
            .collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[tokio::test]
    async fn attendees_resolve_users_and_keep_flags() {
        let gateway = MemoryGateway::new();
        gateway.add_user(User::new("u1", "alice", "student")).await;
        gateway.add_event(entry("e1", "u9", 1, true)).await;
        gateway.attend_anonymously("u1", "e1", Some("Ghost")).await;

        let attendees = gateway.get_attendees("e1").await.unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].user.username, "alice");
        assert!(attendees[0].is_anon);
        assert_eq!(attendees[0].anon_username.as_deref(), Some("Ghost"));
    }

    #[tokio::test]
    async fn injected_failures_until_healed() {
        let gateway = MemoryGateway::new();
        gateway.fail_on("get_event").await;
        let err = gateway.get_event("e1").await.unwrap_err();
        assert_eq!(err.operation(), "get_event");
        assert!(gateway.get_user("u1").await.is_ok());

        gateway.fail_everything().await;
        assert!(gateway.get_user("u1").await.is_err());

        gateway.heal().await;
        assert!(gateway.get_event("e1").await.unwrap().is_none());
    }
}
