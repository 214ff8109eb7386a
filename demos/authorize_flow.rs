//! End-to-end authorization walkthrough.
//!
//! Seeds an in-memory gateway with a few users and events, then runs one
//! request per rule of interest through the standard chain and prints the
//! verdicts and the audit trail.
//!
//! Run with: `cargo run --example authorize_flow`

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use privacy_policy::audit::AuditTrail;
use privacy_policy::gateway::{
    FriendshipStatus, MemoryGateway, PrivacySettings, ProfileVisibility, ScheduleEntry, User,
};
use privacy_policy::service::SettingsUpdate;
use privacy_policy::{Action, Authorizer, PrivacyConfig, PrivacyRequest, PrivacyResponse};

fn show(label: &str, response: &PrivacyResponse) {
    let tag = response
        .handler()
        .map(|tag| tag.to_string())
        .unwrap_or_else(|| "<default deny>".to_string());
    println!(
        "{:<42} allowed={:<5} tag={:<34} reason={}",
        label,
        response.allowed(),
        tag,
        response.reason()
    );
    if let Some(data) = response.data() {
        println!("    data: {}", data);
    }
}

async fn seed() -> Arc<MemoryGateway> {
    let gateway = Arc::new(MemoryGateway::new());
    let users = [
        ("alice", "Alice", ProfileVisibility::Public),
        ("bob", "Bob", ProfileVisibility::FriendsOnly),
        ("carol", "Carol", ProfileVisibility::Private),
        ("dave", "Dave", ProfileVisibility::Public),
    ];
    for (id, name, visibility) in users {
        gateway
            .add_user(User::new(id, name, "student").with_interest("cycling"))
            .await;
        gateway
            .set_privacy_settings(PrivacySettings::new(id).with_visibility(visibility))
            .await;
    }
    gateway.befriend("alice", "bob", FriendshipStatus::Accepted).await;
    gateway.block("carol", "dave").await;

    let start = Utc.with_ymd_and_hms(2026, 11, 7, 9, 0, 0).single();
    let start = start.unwrap_or_else(Utc::now);
    let events = [("ride", "alice", true), ("retreat", "bob", false)];
    for (offset, (id, creator, is_public)) in events.into_iter().enumerate() {
        let begins = start + Duration::days(offset as i64);
        gateway
            .add_event(ScheduleEntry {
                event_id: id.to_string(),
                title: format!("{} weekend", id),
                description: None,
                category: Some("outdoors".to_string()),
                start_date: begins,
                end_date: begins + Duration::hours(6),
                location: Some("Trailhead".to_string()),
                is_public,
                creator_id: creator.to_string(),
            })
            .await;
    }
    for attendee in ["alice", "bob", "dave"] {
        gateway.attend(attendee, "ride").await;
    }
    gateway.attend("dave", "retreat").await;
    gateway.attend_anonymously("carol", "ride", Some("Quiet Rider")).await;
    gateway
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    println!("=== Privacy Authorization Walkthrough ===\n");

    let gateway = seed().await;
    let trail = Arc::new(AuditTrail::new());
    let authorizer =
        Authorizer::new(gateway.clone(), PrivacyConfig::default()).with_audit_trail(trail.clone());

    println!("--- Profiles ---");
    let profile = |requester: &str, target: &str| {
        PrivacyRequest::targeting(requester, target, Action::ViewProfile)
    };
    show("alice views herself", &authorizer.authorize(&profile("alice", "alice")).await);
    show("dave views public alice", &authorizer.authorize(&profile("dave", "alice")).await);
    show("alice views friend bob", &authorizer.authorize(&profile("alice", "bob")).await);
    show("dave views friends-only bob", &authorizer.authorize(&profile("dave", "bob")).await);
    show("alice views private carol", &authorizer.authorize(&profile("alice", "carol")).await);
    show(
        "dave views carol who blocked him",
        &authorizer.authorize(&profile("dave", "carol")).await,
    );

    println!("\n--- Events ---");
    let on_event = |requester: &str, action: Action, event: &str| {
        PrivacyRequest::new(requester, action).with_context(privacy_policy::EVENT_ID, event)
    };
    show(
        "bob lists attendees of a public ride",
        &authorizer.authorize(&on_event("bob", Action::ViewAttendees, "ride")).await,
    );
    show(
        "alice lists attendees of bob's retreat",
        &authorizer.authorize(&on_event("alice", Action::ViewAttendees, "retreat")).await,
    );
    show(
        "alice views the ride carpool",
        &authorizer.authorize(&on_event("alice", Action::ViewCarpool, "ride")).await,
    );
    show(
        "carpool without an event id",
        &authorizer.authorize(&PrivacyRequest::new("alice", Action::ViewCarpool)).await,
    );

    println!("\n--- Schedules ---");
    let schedule = |requester: &str, target: &str| {
        PrivacyRequest::targeting(requester, target, Action::ViewSchedule)
    };
    show("alice views dave's schedule", &authorizer.authorize(&schedule("alice", "dave")).await);

    let update = SettingsUpdate {
        is_anon: true,
        anon_username: Some("Trail Ghost".to_string()),
        profile_visibility: None,
    };
    match authorizer.privacy().update_settings("dave", update).await {
        Ok(settings) => println!("dave is now anonymous as {:?}", settings.anon_username),
        Err(err) => println!("settings update failed: {}", err),
    }
    show(
        "alice views anonymous dave's schedule",
        &authorizer.authorize(&schedule("alice", "dave")).await,
    );
    show("alice views anonymous dave", &authorizer.authorize(&profile("alice", "dave")).await);

    println!("\n--- Storage outage ---");
    gateway.fail_everything().await;
    show(
        "dave views alice during an outage",
        &authorizer.authorize(&profile("dave", "alice")).await,
    );
    gateway.heal().await;

    println!("\n--- Direct handler lookup ---");
    match authorizer.handler_for(Some("view_wallet")) {
        Ok(handler) => println!("unexpected handler for {}", handler.action()),
        Err(err) => println!("lookup refused: {}", err),
    }

    println!("\n--- Audit trail ---");
    for event in trail.events() {
        println!("{}", event);
    }
    println!(
        "\n{} decisions recorded, {} denials",
        trail.len(),
        trail.denials().len()
    );
}
