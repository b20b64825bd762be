//! Backend endpoint table. Paths are relative to the API base URL and can be
//! overridden one by one with `name=/path` pairs.

use super::errors::ValidationError;
use crate::features::entries::MediaKind;
use std::collections::HashMap;
use url::form_urlencoded;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub admin_login: String,
    pub project_manager_login: String,
    pub verify_email: String,
    pub resend_verification: String,
    pub temporary_password: String,
    pub profile: String,
    pub change_password: String,
    pub projects: String,
    pub entries: String,
    pub entry_stats: String,
    pub upload_image: String,
    pub upload_video: String,
    pub upload_document: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            admin_login: "/api/admin/login".to_string(),
            project_manager_login: "/api/project-managers/login".to_string(),
            verify_email: "/api/project-managers/verify-email".to_string(),
            resend_verification: "/api/project-managers/resend-verification".to_string(),
            temporary_password: "/api/project-managers/change-temporary-password".to_string(),
            profile: "/api/profile".to_string(),
            change_password: "/api/profile/change-password".to_string(),
            projects: "/api/projects".to_string(),
            entries: "/api/data-entries".to_string(),
            entry_stats: "/api/data-entries/stats".to_string(),
            upload_image: "/api/uploads/image".to_string(),
            upload_video: "/api/uploads/video".to_string(),
            upload_document: "/api/uploads/document".to_string(),
        }
    }
}

impl Endpoints {
    /// Applies `name=/path` overrides, e.g. `profile=/v2/me,projects=/v2/projects`.
    ///
    /// # Errors
    /// Returns an error string naming the first unknown endpoint or malformed pair.
    pub fn apply_overrides(&mut self, overrides: &str) -> Result<(), String> {
        for (name, path) in parse_overrides(overrides)? {
            let slot = self
                .slot_mut(&name)
                .ok_or_else(|| format!("unknown endpoint: {name}"))?;
            *slot = path;
        }
        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "admin_login" => &mut self.admin_login,
            "project_manager_login" => &mut self.project_manager_login,
            "verify_email" => &mut self.verify_email,
            "resend_verification" => &mut self.resend_verification,
            "temporary_password" => &mut self.temporary_password,
            "profile" => &mut self.profile,
            "change_password" => &mut self.change_password,
            "projects" => &mut self.projects,
            "entries" => &mut self.entries,
            "entry_stats" => &mut self.entry_stats,
            "upload_image" => &mut self.upload_image,
            "upload_video" => &mut self.upload_video,
            "upload_document" => &mut self.upload_document,
            _ => return None,
        };
        Some(slot)
    }

    /// # Errors
    /// Returns `ValidationError::Invalid` for an id that cannot name a record.
    pub fn project(&self, id: &str) -> Result<String, ValidationError> {
        join_id(&self.projects, id)
    }

    /// # Errors
    /// Returns `ValidationError::Invalid` for an id that cannot name a record.
    pub fn entry(&self, id: &str) -> Result<String, ValidationError> {
        join_id(&self.entries, id)
    }

    #[must_use]
    pub fn upload(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.upload_image,
            MediaKind::Video => &self.upload_video,
            MediaKind::Document => &self.upload_document,
        }
    }
}

/// Appends `id` as a single percent-encoded path segment. Empty and
/// dot-only ids are refused since URL parsing collapses them.
fn join_id(collection: &str, id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    if id.chars().all(|c| c == '.') {
        return Err(ValidationError::Invalid(format!("Invalid record id: {id:?}")));
    }

    let segment = form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    Ok(format!("{}/{segment}", collection.trim_end_matches('/')))
}

fn parse_overrides(overrides: &str) -> Result<HashMap<String, String>, String> {
    overrides
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let name = parts.next().unwrap_or_default().trim();
            let path = parts.next().map(str::trim).unwrap_or_default();
            if name.is_empty() || path.is_empty() {
                return Err(format!("invalid endpoint override: {pair}"));
            }
            Ok((name.to_string(), path.to_string()))
        })
        .collect()
}
