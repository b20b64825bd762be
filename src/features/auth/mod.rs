//! Role-based login and the onboarding wizard.
//!
//! A Super Admin signs in with an email; a Project Manager with a login id.
//! After a successful login the session is persisted and the gate policy
//! decides whether the user must verify their email, replace a temporary
//! password, or can go straight to their dashboard.

pub mod client;
pub mod flow;
pub mod types;
pub mod validation;
pub mod wizard;

pub use self::{
    flow::{transition, Event, GatePolicy, InvalidTransition, Step},
    types::{Credentials, LoginOutcome, Role, UserFlags, UserRecord},
    validation::{can_submit_password, PasswordChecklist, PasswordRequirement},
    wizard::{Banner, OnboardingWizard},
};

use crate::{api::ApiError, session::SessionRepository};
use tracing::info;

/// Signs out by removing the stored session.
///
/// # Errors
/// Returns a session store error if the session cannot be removed.
pub fn logout<R: SessionRepository + ?Sized>(sessions: &R) -> Result<(), ApiError> {
    sessions.clear()?;
    info!("signed out");
    Ok(())
}
