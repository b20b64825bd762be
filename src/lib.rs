//! # LEGASI DMS client
//!
//! `legasi_dms` talks to the LEGASI DMS management backend on behalf of Super
//! Admins and Project Managers. It owns the onboarding flow that guards the
//! dashboard, the persisted session, and the project / data-entry features.
//!
//! ## Onboarding
//!
//! 1. **Login:** credentials go to the role-specific login endpoint. Project
//!    Manager payloads send the email as `login_id`.
//! 2. **Gate:** the returned user flags decide the next step. A session is
//!    complete only when `email_verified` is true and `temporal_password` is
//!    false. Which roles are gated is a [`features::auth::GatePolicy`].
//! 3. **Verification:** a 6-digit code, validated locally before submission.
//! 4. **Temporary password:** strength rules are enforced locally before the
//!    new password is sent.
//! 5. **Redirect:** the role dashboard path is reported to the caller.
//!
//! The flow is an explicit state machine ([`features::auth::flow`]) driven by
//! [`features::auth::OnboardingWizard`], so it can be exercised without any UI.
//!
//! ## Sessions
//!
//! The token and the JSON-encoded user record live under two keys of a durable
//! key-value store. Components receive a [`session::SessionRepository`]
//! explicitly; nothing reads the store through globals.
//!
//! ## Responses
//!
//! Some endpoints answer `{"success": true}`, others `{"status": "success"}`.
//! [`api::Envelope`] accepts both and every call returns
//! `Result<_, api::ApiError>`.

pub mod api;
pub mod cli;
pub mod config;
pub mod features;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
