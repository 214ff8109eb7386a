use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{or_safe_default, PrivacyService};
use crate::gateway::ScheduleEntry;

/// Whether a user's schedule is shown under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePrivacyStatus {
    /// User has chosen anonymity
    pub is_anonymous: bool,
    /// Name shown next to the schedule
    pub display_name: String,
}

/// Schedule visibility and event filtering.
#[derive(Clone)]
pub struct ScheduleService {
    privacy: PrivacyService,
}

impl ScheduleService {
    /// Creates a schedule service on top of the shared privacy rules.
    pub fn new(privacy: PrivacyService) -> Self {
        Self { privacy }
    }

    /// True if `viewer` may see `target`'s schedule.
    ///
    /// Anonymity is an absolute bar: no visibility tier applies to schedules,
    /// and only the owner sees an anonymous user's schedule.
    pub async fn can_view_schedule(&self, viewer: &str, target: &str) -> bool {
        self.privacy.can_view_profile(viewer, target).await
    }

    /// Events the user attends, by start time ascending. Empty when unreadable.
    pub async fn user_schedule(&self, user_id: &str) -> Vec<ScheduleEntry> {
        let mut schedule = or_safe_default(
            self.privacy.gateway().get_user_schedule(user_id).await,
            Vec::new(),
        );
        schedule.sort_by_key(|entry| entry.start_date);
        schedule
    }

    /// Keeps events that are public or created by `viewer`.
    pub fn filter_schedule(
        &self,
        viewer: &str,
        schedule: Vec<ScheduleEntry>,
    ) -> Vec<ScheduleEntry> {
        schedule
            .into_iter()
            .filter(|entry| entry.is_public || entry.creator_id == viewer)
            .collect()
    }

    /// Whether the user's schedule is shown anonymously, and under what name.
    pub async fn privacy_status(&self, user_id: &str) -> SchedulePrivacyStatus {
        SchedulePrivacyStatus {
            is_anonymous: self.privacy.is_user_anonymous(user_id).await,
            display_name: self.privacy.display_name(user_id).await,
        }
    }

    /// Up to `limit` events starting at or after `now`, soonest first.
    pub async fn upcoming_events(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<ScheduleEntry> {
        self.user_schedule(user_id)
            .await
            .into_iter()
            .filter(|entry| entry.start_date >= now)
            .take(limit)
            .collect()
    }

    /// Up to `limit` events that ended before `now`, most recent first.
    pub async fn past_events(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<ScheduleEntry> {
        let mut past: Vec<_> = self
            .user_schedule(user_id)
            .await
            .into_iter()
            .filter(|entry| entry.end_date < now)
            .collect();
        past.reverse();
        past.truncate(limit);
        past
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::config::PrivacyConfig;
    use crate::gateway::{MemoryGateway, PrivacySettings, User};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, creator: &str, day: u32, is_public: bool) -> ScheduleEntry {
        ScheduleEntry {
            event_id: id.to_string(),
            title: id.to_string(),
            description: None,
            category: None,
            start_date: at(day),
            end_date: at(day) + Duration::hours(1),
            location: Some("Hall".to_string()),
            is_public,
            creator_id: creator.to_string(),
        }
    }

    async fn fixture() -> (Arc<MemoryGateway>, ScheduleService) {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.add_user(User::new("u1", "alice", "student")).await;
        gateway.set_privacy_settings(PrivacySettings::new("u1")).await;
        for (id, day) in [("e1", 3), ("e2", 9), ("e3", 15), ("e4", 21)] {
            gateway.add_event(entry(id, "host", day, true)).await;
            gateway.attend("u1", id).await;
        }
        let privacy = PrivacyService::new(gateway.clone(), PrivacyConfig::default());
        (gateway, ScheduleService::new(privacy))
    }

    fn ids(entries: &[ScheduleEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.event_id.as_str()).collect()
    }

    #[tokio::test]
    async fn anonymous_schedule_only_visible_to_owner() {
        let (gateway, service) = fixture().await;
        assert!(service.can_view_schedule("u2", "u1").await);

        gateway
            .set_privacy_settings(PrivacySettings::new("u1").anonymous(Some("Ghost")))
            .await;
        assert!(!service.can_view_schedule("u2", "u1").await);
        assert!(service.can_view_schedule("u1", "u1").await);
    }

    #[tokio::test]
    async fn filter_keeps_public_or_own_events() {
        let (_, service) = fixture().await;
        let schedule = vec![
            entry("pub", "host", 1, true),
            entry("mine", "viewer", 2, false),
            entry("theirs", "host", 3, false),
        ];
        let filtered = service.filter_schedule("viewer", schedule);
        assert_eq!(ids(&filtered), ["pub", "mine"]);
    }

    #[tokio::test]
    async fn upcoming_and_past_windows() {
        let (_, service) = fixture().await;
        let now = at(12);

        let upcoming = service.upcoming_events("u1", now, 10).await;
        assert_eq!(ids(&upcoming), ["e3", "e4"]);

        let past = service.past_events("u1", now, 1).await;
        assert_eq!(ids(&past), ["e2"]);
    }

    #[tokio::test]
    async fn schedule_fails_to_empty() {
        let (gateway, service) = fixture().await;
        gateway.fail_on("get_user_schedule").await;
        assert!(service.user_schedule("u1").await.is_empty());
    }

    #[tokio::test]
    async fn privacy_status_reports_alias() {
        let (gateway, service) = fixture().await;
        gateway
            .set_privacy_settings(PrivacySettings::new("u1").anonymous(None))
            .await;
        let status = service.privacy_status("u1").await;
        assert!(status.is_anonymous);
        assert_eq!(status.display_name, "Anonymous User");
    }
}
