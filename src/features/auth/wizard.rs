//! Async driver for the onboarding state machine. Every step catches its own
//! errors and turns them into a banner; nothing escapes to the caller.

use super::{
    client,
    flow::{transition, Event, GatePolicy, Step},
    types::{Credentials, Role},
    validation::{validate_credentials, validate_new_password, validate_verification_code},
};
use crate::{
    api::{errors::DEFAULT_LOGIN_ERROR, ApiClient, ApiError},
    session::{require_session, Session, SessionRepository},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

const DEFAULT_VERIFICATION_ERROR: &str = "Verification failed. Please try again.";
const DEFAULT_RESEND_ERROR: &str = "Could not resend the verification code.";
const DEFAULT_RESET_ERROR: &str = "Password reset failed. Please try again.";

/// Transient message shown above the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

pub struct OnboardingWizard<R> {
    client: ApiClient,
    sessions: R,
    policy: GatePolicy,
    step: Step,
    banner: Option<Banner>,
}

impl<R: SessionRepository> OnboardingWizard<R> {
    /// Starts at the login form.
    pub const fn new(client: ApiClient, sessions: R, policy: GatePolicy) -> Self {
        Self {
            client,
            sessions,
            policy,
            step: Step::Credentials,
            banner: None,
        }
    }

    /// Picks up where a stored session left off.
    ///
    /// # Errors
    /// Returns `ApiError::Unauthenticated` without a stored session, or a
    /// session store error.
    pub fn resume(client: ApiClient, sessions: R, policy: GatePolicy) -> Result<Self, ApiError> {
        let session = require_session(&sessions)?;
        let role = session.user.parsed_role().unwrap_or(Role::ProjectManager);
        let step = policy.gate(role, &session.user);

        debug!("resuming onboarding for {} at {}", role, step.name());

        Ok(Self {
            client,
            sessions,
            policy,
            step,
            banner: None,
        })
    }

    pub const fn step(&self) -> &Step {
        &self.step
    }

    pub const fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub const fn sessions(&self) -> &R {
        &self.sessions
    }

    pub const fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Dashboard path once onboarding has completed.
    pub const fn redirect(&self) -> Option<&'static str> {
        self.step.redirect()
    }

    /// Login form submission. On success the session is persisted before the
    /// gate decides the next step; on failure nothing is persisted.
    pub async fn submit_credentials(&mut self, role: Role, credentials: &Credentials) -> &Step {
        self.banner = None;
        if !self.apply(&Event::Submit { role }) {
            return &self.step;
        }

        if let Err(err) = validate_credentials(&credentials.email, credentials.password.expose_secret())
        {
            self.apply(&Event::LoginFailed {
                message: err.to_string(),
            });
            return &self.step;
        }

        let outcome = match client::login(&self.client, role, credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure("login", &err);
                self.apply(&Event::LoginFailed {
                    message: err.message_or(DEFAULT_LOGIN_ERROR),
                });
                return &self.step;
            }
        };

        // The login endpoint decides the role; keep a label later runs can parse.
        let mut user = outcome.user;
        if user.parsed_role() != Some(role) {
            user.role = Some(role.label().to_string());
        }

        if let Err(err) = self.sessions.set(&outcome.token, &user) {
            let err = ApiError::from(err);
            log_failure("login", &err);
            self.apply(&Event::LoginFailed {
                message: err.user_message(),
            });
            return &self.step;
        }

        if let Some(message) = outcome.message {
            self.banner = Some(Banner::Success(message));
        }
        info!("{} signed in", role);
        self.apply(&Event::LoginSucceeded { user });
        &self.step
    }

    /// Email verification code submission. Malformed codes never reach the network.
    pub async fn submit_verification_code(&mut self, code: &str) -> &Step {
        self.banner = None;
        if !matches!(self.step, Step::NeedsEmailVerification { .. }) {
            self.banner = Some(Banner::Error("No email verification is pending.".to_string()));
            return &self.step;
        }

        let code = match validate_verification_code(code) {
            Ok(code) => code,
            Err(err) => {
                self.banner = Some(Banner::Error(err.to_string()));
                return &self.step;
            }
        };

        let Some(session) = self.current_session(DEFAULT_VERIFICATION_ERROR) else {
            return &self.step;
        };

        match client::verify_email(&self.client, &session.token, code).await {
            Ok(outcome) => {
                let mut user = session.user;
                user.apply_flags(&outcome.flags);
                if outcome.flags.email_verified.is_none() {
                    user.email_verified = true;
                }

                if let Err(err) = self.sessions.set(&session.token, &user) {
                    self.report(&ApiError::from(err), DEFAULT_VERIFICATION_ERROR);
                    return &self.step;
                }

                self.banner = Some(Banner::Success(
                    outcome
                        .message
                        .unwrap_or_else(|| "Email verified successfully.".to_string()),
                ));
                self.apply(&Event::EmailVerified {
                    temporal_password: user.temporal_password,
                });
            }
            Err(err) => self.report(&err, DEFAULT_VERIFICATION_ERROR),
        }
        &self.step
    }

    /// Requests a new verification code. Only the banner changes.
    pub async fn resend_code(&mut self) -> Banner {
        let banner = match require_session(&self.sessions) {
            Ok(session) => {
                match client::resend_verification_code(&self.client, &session.token).await {
                    Ok(message) => Banner::Success(
                        message.unwrap_or_else(|| "A new verification code has been sent.".to_string()),
                    ),
                    Err(err) => {
                        log_failure("resend", &err);
                        Banner::Error(err.message_or(DEFAULT_RESEND_ERROR))
                    }
                }
            }
            Err(err) => {
                log_failure("resend", &err);
                Banner::Error(err.message_or(DEFAULT_RESEND_ERROR))
            }
        };
        self.banner = Some(banner.clone());
        banner
    }

    /// Temporary password replacement. Weak or mismatched passwords never
    /// reach the network.
    pub async fn submit_password_reset(
        &mut self,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> &Step {
        self.banner = None;
        if !matches!(self.step, Step::NeedsPasswordReset { .. }) {
            self.banner = Some(Banner::Error("No password reset is pending.".to_string()));
            return &self.step;
        }

        if let Err(err) =
            validate_new_password(new_password.expose_secret(), confirm_password.expose_secret())
        {
            self.banner = Some(Banner::Error(err.to_string()));
            return &self.step;
        }

        let Some(session) = self.current_session(DEFAULT_RESET_ERROR) else {
            return &self.step;
        };

        let outcome = match client::change_temporary_password(
            &self.client,
            &session.token,
            new_password,
            confirm_password,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(&err, DEFAULT_RESET_ERROR);
                return &self.step;
            }
        };

        let mut user = session.user;
        if let Some(update) = &outcome.user {
            if let Err(err) = user.merge(update) {
                self.report(
                    &ApiError::Unexpected(format!("Failed to merge user: {err}")),
                    DEFAULT_RESET_ERROR,
                );
                return &self.step;
            }
        }
        user.temporal_password = false;

        let token = outcome.token.unwrap_or(session.token);
        if let Err(err) = self.sessions.set(&token, &user) {
            self.report(&ApiError::from(err), DEFAULT_RESET_ERROR);
            return &self.step;
        }

        self.banner = Some(Banner::Success(
            outcome
                .message
                .unwrap_or_else(|| "Password updated successfully.".to_string()),
        ));
        self.apply(&Event::PasswordReset);
        &self.step
    }

    /// Clears the stored session and returns to the login form.
    ///
    /// # Errors
    /// Returns a session store error if the session cannot be removed.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.sessions.clear()?;
        self.step = Step::Credentials;
        self.banner = None;
        Ok(())
    }

    fn current_session(&mut self, default: &str) -> Option<Session> {
        match require_session(&self.sessions) {
            Ok(session) => Some(session),
            Err(err) => {
                self.report(&err, default);
                None
            }
        }
    }

    fn apply(&mut self, event: &Event) -> bool {
        match transition(&self.step, event, &self.policy) {
            Ok(next) => {
                debug!("onboarding {} -> {}", self.step.name(), next.name());
                self.step = next;
                true
            }
            Err(err) => {
                warn!("{err}");
                self.banner = Some(Banner::Error(err.to_string()));
                false
            }
        }
    }

    fn report(&mut self, err: &ApiError, default: &str) {
        log_failure(self.step.name(), err);
        self.banner = Some(Banner::Error(err.message_or(default)));
    }
}

fn log_failure(step: &str, err: &ApiError) {
    match err {
        ApiError::Unexpected(_) | ApiError::Session(_) => error!("{step} failed: {err}"),
        _ => warn!("{step} failed: {err}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{api::Endpoints, session::MemorySessionStore};
    use serde_json::json;
    use std::{net::TcpListener, time::Duration};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn wizard(server: &MockServer) -> OnboardingWizard<MemorySessionStore> {
        let client =
            ApiClient::new(&server.uri(), Duration::from_secs(5), Endpoints::default()).unwrap();
        OnboardingWizard::new(client, MemorySessionStore::in_memory(), GatePolicy::default())
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    async fn mount_login(server: &MockServer, user: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/project-managers/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "pm-token",
                "user": user
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn blank_credentials_fail_without_a_request() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        let step = wizard
            .submit_credentials(Role::ProjectManager, &Credentials::new("  ", secret("x")))
            .await;
        assert_eq!(
            step,
            &Step::Failed {
                message: "Email is required.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn login_persists_role_and_gates_on_flags() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "id": 4, "email_verified": false, "temporal_password": true }),
        )
        .await;

        let mut wizard = wizard(&server);
        let step = wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await
            .clone();
        assert_eq!(
            step,
            Step::NeedsEmailVerification {
                role: Role::ProjectManager
            }
        );

        let session = wizard.sessions().get().unwrap().unwrap();
        assert_eq!(session.token.expose_secret(), "pm-token");
        assert_eq!(session.user.parsed_role(), Some(Role::ProjectManager));
    }

    #[tokio::test]
    async fn malformed_code_never_reaches_the_server() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": false, "temporal_password": false }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/verify-email"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;

        for code in ["12345", "12a456", "1234567"] {
            wizard.submit_verification_code(code).await;
            assert_eq!(
                wizard.banner(),
                Some(&Banner::Error(
                    "Verification code must be exactly 6 digits.".to_string()
                ))
            );
            assert!(matches!(wizard.step(), Step::NeedsEmailVerification { .. }));
        }
    }

    #[tokio::test]
    async fn rejected_code_keeps_the_step_and_shows_the_message() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": false, "temporal_password": false }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/verify-email"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "message": "Invalid or expired code"
            })))
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        wizard.submit_verification_code("000000").await;

        assert!(matches!(wizard.step(), Step::NeedsEmailVerification { .. }));
        assert_eq!(
            wizard.banner(),
            Some(&Banner::Error("Invalid or expired code".to_string()))
        );
        assert!(!wizard.sessions().get().unwrap().unwrap().user.email_verified);
    }

    #[tokio::test]
    async fn resend_only_changes_the_banner() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": false, "temporal_password": true }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/resend-verification"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Code sent"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        let banner = wizard.resend_code().await;

        assert_eq!(banner, Banner::Success("Code sent".to_string()));
        assert!(matches!(wizard.step(), Step::NeedsEmailVerification { .. }));
    }

    #[tokio::test]
    async fn weak_password_is_refused_locally() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": true, "temporal_password": true }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/change-temporary-password"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        wizard
            .submit_password_reset(&secret("password"), &secret("password"))
            .await;

        assert!(matches!(wizard.step(), Step::NeedsPasswordReset { .. }));
        assert!(wizard.banner().is_some_and(Banner::is_error));
    }

    #[tokio::test]
    async fn password_reset_keeps_token_and_clears_flag() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "id": 4, "email_verified": true, "temporal_password": true }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/change-temporary-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": { "fullname": "Ada Obi" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        wizard
            .submit_password_reset(&secret("Aa1!Aa1!"), &secret("Aa1!Aa1!"))
            .await;

        assert_eq!(wizard.redirect(), Some("/project-manager"));
        let session = wizard.sessions().get().unwrap().unwrap();
        assert_eq!(session.token.expose_secret(), "pm-token");
        assert!(!session.user.temporal_password);
        assert_eq!(session.user.fullname.as_deref(), Some("Ada Obi"));
    }

    #[tokio::test]
    async fn login_replaces_an_unrecognized_role_label() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "role": "project_manager_field", "email_verified": false }),
        )
        .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;

        let session = wizard.sessions().get().unwrap().unwrap();
        assert_eq!(session.user.role.as_deref(), Some("Project Manager"));
    }

    #[tokio::test]
    async fn verified_code_redirects_to_the_dashboard() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": false, "temporal_password": false }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/verify-email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "Email verified successfully",
                "user": { "email_verified": true, "temporal_password": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        let step = wizard.submit_verification_code("123456").await.clone();

        assert_eq!(
            step,
            Step::Complete {
                role: Role::ProjectManager
            }
        );
        assert_eq!(wizard.redirect(), Some("/project-manager"));
        assert_eq!(
            wizard.banner(),
            Some(&Banner::Success("Email verified successfully".to_string()))
        );
        let user = wizard.sessions().get().unwrap().unwrap().user;
        assert!(user.email_verified);
        assert!(!user.temporal_password);
    }

    #[tokio::test]
    async fn verification_without_flags_marks_email_verified() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_login(
            &server,
            json!({ "email_verified": false, "temporal_password": true }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/project-managers/verify-email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let mut wizard = wizard(&server);
        wizard
            .submit_credentials(
                Role::ProjectManager,
                &Credentials::new("pm@example.com", secret("Temp123!")),
            )
            .await;
        let step = wizard.submit_verification_code("123456").await.clone();

        assert_eq!(
            step,
            Step::NeedsPasswordReset {
                role: Role::ProjectManager
            }
        );
        assert_eq!(
            wizard.banner(),
            Some(&Banner::Success("Email verified successfully.".to_string()))
        );
        let user = wizard.sessions().get().unwrap().unwrap().user;
        assert!(user.email_verified);
        assert!(user.temporal_password);
    }

    #[test]
    fn resume_without_session_is_unauthenticated() {
        let client = ApiClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            Endpoints::default(),
        )
        .unwrap();
        let result = OnboardingWizard::resume(
            client,
            MemorySessionStore::in_memory(),
            GatePolicy::default(),
        );
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn resume_picks_the_pending_step() {
        let sessions = MemorySessionStore::in_memory();
        let user = crate::features::auth::UserRecord {
            role: Some("Project Manager".to_string()),
            email_verified: true,
            temporal_password: true,
            ..Default::default()
        };
        sessions.set(&secret("tok"), &user).unwrap();

        let client = ApiClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            Endpoints::default(),
        )
        .unwrap();
        let wizard = OnboardingWizard::resume(client, sessions, GatePolicy::default()).unwrap();
        assert_eq!(
            wizard.step(),
            &Step::NeedsPasswordReset {
                role: Role::ProjectManager
            }
        );
    }
}
