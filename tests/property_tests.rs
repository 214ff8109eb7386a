//! Property tests for the privacy engine.
//!
//! These exercise the dispatch and redaction invariants across generated
//! users, settings and requests.

use std::future::Future;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use privacy_policy::gateway::{
    MemoryGateway, PrivacySettings, ProfileVisibility, ScheduleEntry, User,
};
use privacy_policy::handler::ViewProfileHandler;
use privacy_policy::{
    Action, Authorizer, HandlerChain, PolicyHandler, PrivacyConfig, PrivacyRequest,
    PrivacyResponse, PrivacyService, EVENT_ID,
};
use proptest::prelude::*;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

fn arb_user_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("u[0-9]{1,3}").unwrap()
}

fn arb_visibility() -> impl Strategy<Value = ProfileVisibility> {
    prop_oneof![
        Just(ProfileVisibility::Public),
        Just(ProfileVisibility::FriendsOnly),
        Just(ProfileVisibility::Private),
    ]
}

fn arb_alias() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[A-Z][a-z]{2,8}").unwrap())
}

fn public_event(id: &str, creator: &str) -> ScheduleEntry {
    let start = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    ScheduleEntry {
        event_id: id.to_string(),
        title: "Open day".to_string(),
        description: None,
        category: None,
        start_date: start,
        end_date: start,
        location: None,
        is_public: true,
        creator_id: creator.to_string(),
    }
}

proptest! {
    /// A handler never claims an action it does not own.
    #[test]
    fn handlers_ignore_foreign_actions(
        owned in arb_action(),
        requested in arb_action(),
        requester in arb_user_id(),
    ) {
        prop_assume!(owned != requested);
        let gateway = Arc::new(MemoryGateway::new());
        let handler = privacy_policy::handler::handler_for_action(
            owned,
            gateway,
            &PrivacyConfig::default(),
        );

        let result = block_on(handler.process(&PrivacyRequest::new(requester, requested)));
        prop_assert!(!result.is_handled());
        prop_assert!(result.response().is_none());
    }

    /// A chain missing the requested action answers with the default deny.
    #[test]
    fn unclaimed_actions_get_default_deny(
        requested in arb_action(),
        requester in arb_user_id(),
        target in arb_user_id(),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let chain = Action::ALL
            .into_iter()
            .filter(|action| *action != requested)
            .fold(HandlerChain::new(), |chain, action| {
                chain.link_boxed(privacy_policy::handler::handler_for_action(
                    action,
                    gateway.clone(),
                    &PrivacyConfig::default(),
                ))
            });

        let request = PrivacyRequest::targeting(requester, target, requested);
        let response = block_on(chain.handle(&request));

        prop_assert_eq!(&response, &PrivacyResponse::default_deny());
        prop_assert!(!response.allowed());
        prop_assert!(response.data().is_none());
        prop_assert!(!response.is_anon());
        prop_assert!(response.anon_name().is_none());
    }

    /// Self-requests always see their own real profile.
    #[test]
    fn self_profile_is_always_raw(
        user in arb_user_id(),
        visibility in arb_visibility(),
        anonymous in any::<bool>(),
        alias in arb_alias(),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let mut settings = PrivacySettings::new(user.as_str()).with_visibility(visibility);
        if anonymous {
            settings = settings.anonymous(alias.as_deref());
        }
        let response = block_on(async {
            gateway.add_user(User::new(user.as_str(), "realname", "student")).await;
            gateway.set_privacy_settings(settings).await;
            let privacy = PrivacyService::new(gateway.clone(), PrivacyConfig::default());
            let handler = ViewProfileHandler::new(privacy);
            let request =
                PrivacyRequest::targeting(user.as_str(), user.as_str(), Action::ViewProfile);
            handler.handle(&request).await
        });

        prop_assert!(response.allowed());
        prop_assert!(!response.is_anon());
        prop_assert_eq!(response.handler().unwrap().to_string(), "ViewProfileHandler-Self");
        prop_assert_eq!(&response.data().unwrap()["username"], "realname");
    }

    /// A block in either direction wins over every visibility tier.
    #[test]
    fn blocks_always_deny(
        visibility in arb_visibility(),
        anonymous in any::<bool>(),
        blocker_is_target in any::<bool>(),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let mut settings = PrivacySettings::new("target").with_visibility(visibility);
        if anonymous {
            settings = settings.anonymous(None);
        }
        let response = block_on(async {
            gateway.add_user(User::new("target", "tina", "student")).await;
            gateway.set_privacy_settings(settings).await;
            if blocker_is_target {
                gateway.block("target", "viewer").await;
            } else {
                gateway.block("viewer", "target").await;
            }
            let authorizer = Authorizer::new(gateway.clone(), PrivacyConfig::default());
            let request = PrivacyRequest::targeting("viewer", "target", Action::ViewProfile);
            authorizer.authorize(&request).await
        });

        prop_assert!(!response.allowed());
        prop_assert_eq!(response.reason(), "Access blocked");
    }

    /// Anonymous profiles carry the alias, or the configured fallback.
    #[test]
    fn anonymous_profiles_use_alias_or_fallback(
        visibility in arb_visibility(),
        alias in arb_alias(),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let settings = PrivacySettings::new("target")
            .with_visibility(visibility)
            .anonymous(alias.as_deref());
        let response = block_on(async {
            gateway.add_user(User::new("target", "tina_real", "student")).await;
            gateway.set_privacy_settings(settings).await;
            let authorizer = Authorizer::new(gateway.clone(), PrivacyConfig::default());
            let request = PrivacyRequest::targeting("viewer", "target", Action::ViewProfile);
            authorizer.authorize(&request).await
        });

        let expected = alias.unwrap_or_else(|| "Anonymous User".to_string());
        prop_assert!(response.allowed());
        prop_assert!(response.is_anon());
        prop_assert_eq!(response.anon_name(), Some(expected.as_str()));
        prop_assert!(!response.data().unwrap().to_string().contains("tina_real"));
    }

    /// Carpool rosters never list a user whose settings are anonymous.
    #[test]
    fn carpool_never_lists_anonymous_users(
        flags in prop::collection::vec(any::<bool>(), 1..8),
        viewer_index in 0usize..8,
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let viewer = format!("p{}", viewer_index % flags.len());
        let response = block_on(async {
            gateway.add_event(public_event("trip", "host")).await;
            for (i, anonymous) in flags.iter().enumerate() {
                let id = format!("p{i}");
                gateway.add_user(User::new(id.as_str(), format!("name{i}"), "student")).await;
                let mut settings = PrivacySettings::new(id.as_str());
                if *anonymous {
                    settings = settings.anonymous(Some("Hidden"));
                }
                gateway.set_privacy_settings(settings).await;
                gateway.attend(&id, "trip").await;
            }
            let authorizer = Authorizer::new(gateway.clone(), PrivacyConfig::default());
            let request = PrivacyRequest::new(viewer.as_str(), Action::ViewCarpool)
                .with_context(EVENT_ID, "trip");
            authorizer.authorize(&request).await
        });

        prop_assert!(response.allowed());
        let listed: Vec<String> = response
            .data()
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["userId"].as_str().unwrap().to_string())
            .collect();
        for (i, anonymous) in flags.iter().enumerate() {
            let id = format!("p{i}");
            prop_assert_eq!(listed.contains(&id), !anonymous);
        }
    }

    /// Only the owner sees an anonymous user's schedule.
    #[test]
    fn schedule_bars_anonymous_targets(
        requester in arb_user_id(),
        target in arb_user_id(),
        visibility in arb_visibility(),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let settings = PrivacySettings::new(target.as_str())
            .with_visibility(visibility)
            .anonymous(Some("Ghost"));
        let response = block_on(async {
            gateway.set_privacy_settings(settings).await;
            let authorizer = Authorizer::new(gateway.clone(), PrivacyConfig::default());
            let request = PrivacyRequest::targeting(
                requester.as_str(),
                target.as_str(),
                Action::ViewSchedule,
            );
            authorizer.authorize(&request).await
        });

        prop_assert_eq!(response.allowed(), requester == target);
    }

    /// Anyone may list the attendees of a public event.
    #[test]
    fn public_event_attendees_are_open(
        requester in arb_user_id(),
        attendees in prop::collection::vec(arb_user_id(), 0..6),
    ) {
        let gateway = Arc::new(MemoryGateway::new());
        let response = block_on(async {
            gateway.add_event(public_event("fair", "host")).await;
            for id in &attendees {
                gateway.add_user(User::new(id.as_str(), "someone", "student")).await;
                gateway.attend(id, "fair").await;
            }
            let authorizer = Authorizer::new(gateway.clone(), PrivacyConfig::default());
            let request = PrivacyRequest::new(requester.as_str(), Action::ViewAttendees)
                .with_context(EVENT_ID, "fair");
            authorizer.authorize(&request).await
        });

        prop_assert!(response.allowed());
        prop_assert!(response.handler().is_some());
    }
}
