use crate::api::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, path::Path};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    /// Multipart field the upload endpoint expects the file under.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// Key under which uploaded URLs are listed in an entry payload.
    #[must_use]
    pub const fn collection_key(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Document => "documents",
        }
    }

    /// Guesses the kind from the file extension; anything unrecognized is a document.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "heic" => Self::Image,
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "3gp" => Self::Video,
            _ => Self::Document,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A file the backend has accepted, referenced by URL from entry payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(
        default,
        alias = "projectId",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry fields to create or update, plus the media already uploaded for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryDraft {
    pub project_id: Option<RecordId>,
    pub fields: Map<String, Value>,
    pub media: Vec<MediaRef>,
}

impl EntryDraft {
    #[must_use]
    pub fn new(project_id: Option<RecordId>, fields: Map<String, Value>) -> Self {
        Self {
            project_id,
            fields,
            media: Vec::new(),
        }
    }

    /// JSON body sent to the backend. Media URLs are grouped by kind.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut payload = self.fields.clone();
        if let Some(project_id) = &self.project_id {
            payload.insert("project_id".to_string(), json_id(project_id));
        }

        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Document] {
            let urls: Vec<Value> = self
                .media
                .iter()
                .filter(|media| media.kind == kind)
                .map(|media| Value::String(media.url.clone()))
                .collect();
            if !urls.is_empty() {
                payload.insert(kind.collection_key().to_string(), Value::Array(urls));
            }
        }

        Value::Object(payload)
    }
}

fn json_id(id: &RecordId) -> Value {
    match id {
        RecordId::Number(id) => Value::from(*id),
        RecordId::Text(id) => Value::String(id.clone()),
    }
}

/// Aggregate counters reported by the backend. The set of keys varies by role.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryStats(pub Map<String, Value>);

impl EntryStats {
    #[must_use]
    pub fn count(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }
}
