//! Landing data for a role dashboard. Projects and entry statistics are
//! fetched concurrently and each half reports its own error, so one failing
//! endpoint does not blank the whole page.

use crate::{
    api::{ApiClient, ApiError},
    features::{
        auth::{GatePolicy, Role},
        entries::{client::fetch_stats_with_token, EntryStats},
        projects::{fetch_projects, Project},
    },
    session::{require_session, SessionRepository},
};
use tracing::{instrument, warn};

#[derive(Debug)]
pub struct DashboardSnapshot {
    pub role: Role,
    pub user: String,
    /// Route this dashboard lives at.
    pub path: &'static str,
    pub projects: Result<Vec<Project>, ApiError>,
    pub stats: Result<EntryStats, ApiError>,
}

/// Loads the dashboard for the signed-in user.
///
/// # Errors
/// Returns `ApiError::Unauthenticated` without a session, or
/// `ApiError::OnboardingIncomplete` while the gate still blocks the user.
#[instrument(skip_all)]
pub async fn load_dashboard<R: SessionRepository + ?Sized>(
    client: &ApiClient,
    sessions: &R,
    policy: &GatePolicy,
) -> Result<DashboardSnapshot, ApiError> {
    let session = require_session(sessions)?;
    // An unrecognized role is gated like a Project Manager.
    let role = session.user.parsed_role().unwrap_or(Role::ProjectManager);

    let step = policy.gate(role, &session.user);
    if step.redirect().is_none() {
        return Err(ApiError::OnboardingIncomplete(step.name()));
    }

    let (projects, stats) = tokio::join!(
        fetch_projects(client, &session.token),
        fetch_stats_with_token(client, &session.token),
    );

    if let Err(err) = &projects {
        warn!("dashboard projects unavailable: {err}");
    }
    if let Err(err) = &stats {
        warn!("dashboard stats unavailable: {err}");
    }

    Ok(DashboardSnapshot {
        role,
        user: session.user.display_name().to_string(),
        path: role.dashboard_path(),
        projects,
        stats,
    })
}
