//! Privacy authorization engine for a social events platform.
//!
//! Decides whether one user may see another user's profile, an event's
//! attendee list, an event's carpool roster, or a user's schedule. Decisions
//! depend on relationship state (self, friend, blocked), the target's
//! visibility tier, event publicity, attendance, and an anonymity toggle that
//! redacts identity wherever it applies.
//!
//! # Core Types
//!
//! - [`PrivacyRequest`]: who asks, about whom, for which [`Action`]
//! - [`PrivacyResponse`]: the verdict, an optional payload, and the
//!   [`HandlerTag`] of the rule that fired
//! - [`PolicyHandler`](handler::PolicyHandler): one per action, applying
//!   ordered visibility rules
//! - [`HandlerChain`]: an immutable ordered list of handlers; the first
//!   handler that owns the action decides
//! - [`Authorizer`]: the standard chain plus decision auditing
//! - [`PersistenceGateway`](gateway::PersistenceGateway): every read and
//!   write the engine performs
//!
//! Storage faults never grant access. Predicates fail closed and listings
//! fail to empty.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use privacy_policy::{Action, Authorizer, PrivacyConfig, PrivacyRequest};
//! use privacy_policy::gateway::{MemoryGateway, PrivacySettings, User};
//!
//! # block_on(async {
//! let gateway = Arc::new(MemoryGateway::new());
//! gateway.add_user(User::new("u2", "bob", "student")).await;
//! gateway
//!     .set_privacy_settings(PrivacySettings::new("u2").anonymous(Some("Night Owl")))
//!     .await;
//!
//! let authorizer = Authorizer::new(gateway, PrivacyConfig::default());
//! let response = authorizer
//!     .authorize(&PrivacyRequest::targeting("u1", "u2", Action::ViewProfile))
//!     .await;
//!
//! assert!(response.allowed());
//! assert!(response.is_anon());
//! assert_eq!(response.anon_name(), Some("Night Owl"));
//! assert_eq!(response.data().unwrap()["username"], "Night Owl");
//! # });
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod authorizer;
mod config;
mod error;
mod request;
mod response;

pub mod audit;
pub mod gateway;
pub mod handler;
pub mod service;

pub use action::Action;
pub use authorizer::Authorizer;
pub use config::PrivacyConfig;
pub use error::{Error, GatewayError};
pub use handler::{
    create_handler_chain, create_specific_handler, HandlerChain, HandlerResult, PolicyHandler,
};
pub use request::{PrivacyRequest, EVENT_ID};
pub use response::{Branch, HandlerTag, PrivacyResponse};
pub use service::PrivacyService;
