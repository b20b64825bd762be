//! Onboarding state machine. `transition` is pure: it takes the current step,
//! an event and the gate policy, and returns the next step. All I/O lives in
//! the wizard driving it.

use super::types::{Role, UserRecord};
use thiserror::Error;

/// Which roles must finish email verification and the temporary password
/// reset before reaching the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatePolicy {
    pub super_admin: bool,
    pub project_manager: bool,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            super_admin: false,
            project_manager: true,
        }
    }
}

impl GatePolicy {
    #[must_use]
    pub const fn enforces(&self, role: Role) -> bool {
        match role {
            Role::SuperAdmin => self.super_admin,
            Role::ProjectManager => self.project_manager,
        }
    }

    /// Dashboard access check for a stored user.
    #[must_use]
    pub const fn allows_dashboard(&self, role: Role, user: &UserRecord) -> bool {
        !self.enforces(role) || (user.email_verified && !user.temporal_password)
    }

    /// Step that follows a confirmed user state.
    #[must_use]
    pub const fn gate(&self, role: Role, user: &UserRecord) -> Step {
        if !self.enforces(role) {
            Step::Complete { role }
        } else if !user.email_verified {
            Step::NeedsEmailVerification { role }
        } else if user.temporal_password {
            Step::NeedsPasswordReset { role }
        } else {
            Step::Complete { role }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Login form, nothing submitted yet.
    Credentials,
    Authenticating { role: Role },
    NeedsEmailVerification { role: Role },
    NeedsPasswordReset { role: Role },
    /// Login rejected; the form stays up and may be resubmitted.
    Failed { message: String },
    /// Onboarding done; redirect to the role dashboard.
    Complete { role: Role },
}

impl Step {
    /// Dashboard path once the flow is complete.
    #[must_use]
    pub const fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Complete { role } => Some(role.dashboard_path()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticating { role }
            | Self::NeedsEmailVerification { role }
            | Self::NeedsPasswordReset { role }
            | Self::Complete { role } => Some(*role),
            Self::Credentials | Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Authenticating { .. } => "authenticating",
            Self::NeedsEmailVerification { .. } => "email-verification",
            Self::NeedsPasswordReset { .. } => "password-reset",
            Self::Failed { .. } => "failed",
            Self::Complete { .. } => "complete",
        }
    }
}

#[derive(Clone, Debug)]
pub enum Event {
    Submit { role: Role },
    LoginSucceeded { user: UserRecord },
    LoginFailed { message: String },
    EmailVerified { temporal_password: bool },
    PasswordReset,
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::LoginSucceeded { .. } => "login-succeeded",
            Self::LoginFailed { .. } => "login-failed",
            Self::EmailVerified { .. } => "email-verified",
            Self::PasswordReset => "password-reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot apply {event} in step {step}")]
pub struct InvalidTransition {
    pub step: &'static str,
    pub event: &'static str,
}

/// Next step for `event` in `step`. Failed verification and reset
/// submissions are not events: those steps simply stay put.
///
/// # Errors
/// Returns `InvalidTransition` when the event does not belong to the step.
pub fn transition(step: &Step, event: &Event, policy: &GatePolicy) -> Result<Step, InvalidTransition> {
    let next = match (step, event) {
        (Step::Credentials | Step::Failed { .. }, Event::Submit { role }) => {
            Step::Authenticating { role: *role }
        }
        (Step::Authenticating { role }, Event::LoginSucceeded { user }) => policy.gate(*role, user),
        (Step::Authenticating { .. }, Event::LoginFailed { message }) => Step::Failed {
            message: message.clone(),
        },
        (Step::NeedsEmailVerification { role }, Event::EmailVerified { temporal_password }) => {
            if *temporal_password {
                Step::NeedsPasswordReset { role: *role }
            } else {
                Step::Complete { role: *role }
            }
        }
        (Step::NeedsPasswordReset { role }, Event::PasswordReset) => Step::Complete { role: *role },
        _ => {
            return Err(InvalidTransition {
                step: step.name(),
                event: event.name(),
            })
        }
    };
    Ok(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(email_verified: bool, temporal_password: bool) -> UserRecord {
        UserRecord {
            email_verified,
            temporal_password,
            ..UserRecord::default()
        }
    }

    fn after_login(role: Role, user: UserRecord, policy: &GatePolicy) -> Step {
        let step = transition(&Step::Credentials, &Event::Submit { role }, policy).unwrap();
        transition(&step, &Event::LoginSucceeded { user }, policy).unwrap()
    }

    #[test]
    fn unverified_project_manager_must_verify() {
        let step = after_login(Role::ProjectManager, user(false, true), &GatePolicy::default());
        assert_eq!(
            step,
            Step::NeedsEmailVerification {
                role: Role::ProjectManager
            }
        );
        assert_eq!(step.redirect(), None);
    }

    #[test]
    fn temporary_password_requires_reset() {
        let step = after_login(Role::ProjectManager, user(true, true), &GatePolicy::default());
        assert_eq!(
            step,
            Step::NeedsPasswordReset {
                role: Role::ProjectManager
            }
        );
    }

    #[test]
    fn complete_project_manager_goes_straight_to_dashboard() {
        let step = after_login(Role::ProjectManager, user(true, false), &GatePolicy::default());
        assert_eq!(step.redirect(), Some("/project-manager"));
    }

    #[test]
    fn super_admin_bypasses_gate_by_default() {
        let step = after_login(Role::SuperAdmin, user(false, true), &GatePolicy::default());
        assert_eq!(step.redirect(), Some("/super-admin"));
    }

    #[test]
    fn super_admin_gate_can_be_enforced() {
        let policy = GatePolicy {
            super_admin: true,
            project_manager: true,
        };
        let step = after_login(Role::SuperAdmin, user(false, false), &policy);
        assert_eq!(
            step,
            Step::NeedsEmailVerification {
                role: Role::SuperAdmin
            }
        );
    }

    #[test]
    fn project_manager_gate_can_be_relaxed() {
        let policy = GatePolicy {
            super_admin: false,
            project_manager: false,
        };
        let step = after_login(Role::ProjectManager, user(false, true), &policy);
        assert_eq!(step.redirect(), Some("/project-manager"));
    }

    #[test]
    fn verification_leads_to_reset_or_dashboard() {
        let policy = GatePolicy::default();
        let verifying = Step::NeedsEmailVerification {
            role: Role::ProjectManager,
        };

        let next = transition(
            &verifying,
            &Event::EmailVerified {
                temporal_password: true,
            },
            &policy,
        )
        .unwrap();
        assert_eq!(
            next,
            Step::NeedsPasswordReset {
                role: Role::ProjectManager
            }
        );

        let next = transition(
            &verifying,
            &Event::EmailVerified {
                temporal_password: false,
            },
            &policy,
        )
        .unwrap();
        assert_eq!(next.redirect(), Some("/project-manager"));

        let done = transition(
            &Step::NeedsPasswordReset {
                role: Role::ProjectManager,
            },
            &Event::PasswordReset,
            &policy,
        )
        .unwrap();
        assert_eq!(done.redirect(), Some("/project-manager"));
    }

    #[test]
    fn failed_login_can_be_retried() {
        let policy = GatePolicy::default();
        let authenticating = Step::Authenticating {
            role: Role::ProjectManager,
        };
        let failed = transition(
            &authenticating,
            &Event::LoginFailed {
                message: "Invalid credentials".to_string(),
            },
            &policy,
        )
        .unwrap();
        assert_eq!(
            failed,
            Step::Failed {
                message: "Invalid credentials".to_string()
            }
        );

        let retry = transition(
            &failed,
            &Event::Submit {
                role: Role::SuperAdmin,
            },
            &policy,
        )
        .unwrap();
        assert_eq!(
            retry,
            Step::Authenticating {
                role: Role::SuperAdmin
            }
        );
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let policy = GatePolicy::default();
        let err = transition(
            &Step::Credentials,
            &Event::EmailVerified {
                temporal_password: false,
            },
            &policy,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "cannot apply email-verified in step credentials");

        assert!(transition(
            &Step::Complete {
                role: Role::ProjectManager
            },
            &Event::Submit {
                role: Role::ProjectManager
            },
            &policy,
        )
        .is_err());
        assert!(transition(
            &Step::NeedsEmailVerification {
                role: Role::ProjectManager
            },
            &Event::PasswordReset,
            &policy,
        )
        .is_err());
    }

    #[test]
    fn allows_dashboard_follows_policy() {
        let policy = GatePolicy::default();
        assert!(!policy.allows_dashboard(Role::ProjectManager, &user(true, true)));
        assert!(policy.allows_dashboard(Role::ProjectManager, &user(true, false)));
        assert!(policy.allows_dashboard(Role::SuperAdmin, &user(false, true)));
    }
}
