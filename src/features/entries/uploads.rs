//! Media uploads for data entries.
//!
//! Files attached before submission are uploaded one after another. Files
//! attached while other uploads are running get their own task. Before an
//! entry is submitted the queue is settled: every in-flight task is awaited
//! and, if any file failed, submission is refused with the list of failures.
//! Files that did upload are kept; the user may retry or remove the rest.

use super::types::{MediaKind, MediaRef};
use crate::api::{ApiClient, ApiError, Envelope, UploadFailure, ValidationError};
use futures_util::future::join_all;
use reqwest::multipart::{Form, Part};
use secrecy::SecretString;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Uploads one file to the endpoint for its kind.
///
/// # Errors
/// Returns `ValidationError::Invalid` if the file cannot be read, or any
/// backend error.
#[instrument(skip(client, token), fields(path = %path.display()))]
pub async fn upload_media(
    client: &ApiClient,
    token: &SecretString,
    kind: MediaKind,
    path: &Path,
) -> Result<MediaRef, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        ValidationError::Invalid(format!("Cannot read {}: {err}", path.display()))
    })?;
    let name = display_name(path);

    debug!("uploading {} ({} bytes) as {}", name, bytes.len(), kind);

    let part = Part::bytes(bytes).file_name(name.clone());
    let form = Form::new().part(kind.field_name(), part);
    let envelope = client
        .post_multipart(client.endpoints().upload(kind), form, Some(token))
        .await?;

    let url = uploaded_url(&envelope)
        .ok_or_else(|| ApiError::Unexpected("Upload response is missing the file URL".to_string()))?;

    Ok(MediaRef {
        kind,
        url,
        name: Some(name),
    })
}

const URL_KEYS: [&str; 4] = ["url", "file_url", "fileUrl", "path"];

fn uploaded_url(envelope: &Envelope) -> Option<String> {
    let from_object = |value: &serde_json::Map<String, Value>| {
        URL_KEYS
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    };

    let nested = match &envelope.data {
        Some(Value::String(url)) => Some(url.clone()),
        Some(Value::Object(data)) => from_object(data),
        _ => None,
    };
    nested
        .or_else(|| from_object(&envelope.extra))
        .filter(|url| !url.trim().is_empty())
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

pub type UploadId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadState {
    Pending,
    Uploading,
    Uploaded(MediaRef),
    Failed(String),
}

#[derive(Debug)]
struct QueuedUpload {
    id: UploadId,
    path: PathBuf,
    kind: MediaKind,
    state: UploadState,
    task: Option<JoinHandle<Result<MediaRef, ApiError>>>,
}

/// Read-only view of one queued file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadStatus<'a> {
    pub id: UploadId,
    pub path: &'a Path,
    pub kind: MediaKind,
    pub state: &'a UploadState,
}

pub struct UploadQueue {
    client: ApiClient,
    token: SecretString,
    next_id: UploadId,
    items: Vec<QueuedUpload>,
}

impl UploadQueue {
    #[must_use]
    pub const fn new(client: ApiClient, token: SecretString) -> Self {
        Self {
            client,
            token,
            next_id: 1,
            items: Vec::new(),
        }
    }

    /// Queues a file for the next sequential batch.
    pub fn attach(&mut self, path: impl Into<PathBuf>) -> UploadId {
        let path = path.into();
        let kind = MediaKind::from_path(&path);
        self.push(path, kind, UploadState::Pending, None)
    }

    /// Queues a file and starts uploading it right away in its own task.
    pub fn attach_and_spawn(&mut self, path: impl Into<PathBuf>) -> UploadId {
        let path = path.into();
        let kind = MediaKind::from_path(&path);
        let task = self.spawn(kind, path.clone());
        self.push(path, kind, UploadState::Uploading, Some(task))
    }

    /// Uploads every pending file, one after another.
    pub async fn upload_queued(&mut self) {
        for index in 0..self.items.len() {
            if self.items[index].state != UploadState::Pending {
                continue;
            }
            self.items[index].state = UploadState::Uploading;
            let (kind, path) = (self.items[index].kind, self.items[index].path.clone());
            let result = upload_media(&self.client, &self.token, kind, &path).await;
            self.items[index].state = settled_state(&path, result);
        }
    }

    /// Starts a new upload for a failed file.
    ///
    /// # Errors
    /// Returns `ValidationError::Invalid` if `id` is unknown or not failed.
    pub fn retry(&mut self, id: UploadId) -> Result<(), ApiError> {
        let index = self.index_of(id)?;
        if !matches!(self.items[index].state, UploadState::Failed(_)) {
            return Err(ValidationError::Invalid(format!("Upload {id} has not failed.")).into());
        }

        let (kind, path) = (self.items[index].kind, self.items[index].path.clone());
        let task = self.spawn(kind, path);
        let item = &mut self.items[index];
        item.state = UploadState::Uploading;
        item.task = Some(task);
        Ok(())
    }

    /// Drops a file from the queue.
    ///
    /// # Errors
    /// Returns `ValidationError::Invalid` if `id` is unknown or still uploading.
    pub fn remove(&mut self, id: UploadId) -> Result<(), ApiError> {
        let index = self.index_of(id)?;
        if self.items[index].state == UploadState::Uploading {
            return Err(
                ValidationError::Invalid(format!("Upload {id} is still in progress.")).into(),
            );
        }
        self.items.remove(index);
        Ok(())
    }

    /// Uploads anything still pending, waits for every running upload and
    /// returns the uploaded media.
    ///
    /// # Errors
    /// Returns `ApiError::Uploads` listing every file that failed. Files that
    /// uploaded successfully stay uploaded.
    pub async fn settle(&mut self) -> Result<Vec<MediaRef>, ApiError> {
        self.upload_queued().await;

        let running: Vec<(UploadId, JoinHandle<Result<MediaRef, ApiError>>)> = self
            .items
            .iter_mut()
            .filter_map(|item| item.task.take().map(|task| (item.id, task)))
            .collect();

        if !running.is_empty() {
            debug!("waiting for {} background uploads", running.len());
            let (ids, tasks): (Vec<_>, Vec<_>) = running.into_iter().unzip();
            let results = join_all(tasks).await;

            for (id, joined) in ids.into_iter().zip(results) {
                let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
                    continue;
                };
                let result = joined.unwrap_or_else(|err| {
                    Err(ApiError::Unexpected(format!("Upload task failed: {err}")))
                });
                item.state = settled_state(&item.path, result);
            }
        }

        let failures = self.failures();
        if failures.is_empty() {
            Ok(self.uploaded())
        } else {
            Err(ApiError::Uploads(failures))
        }
    }

    #[must_use]
    pub fn uploaded(&self) -> Vec<MediaRef> {
        self.items
            .iter()
            .filter_map(|item| match &item.state {
                UploadState::Uploaded(media) => Some(media.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<UploadFailure> {
        self.items
            .iter()
            .filter_map(|item| match &item.state {
                UploadState::Failed(message) => Some(UploadFailure {
                    file: display_name(&item.path),
                    message: message.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> impl Iterator<Item = UploadStatus<'_>> {
        self.items.iter().map(|item| UploadStatus {
            id: item.id,
            path: &item.path,
            kind: item.kind,
            state: &item.state,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(
        &mut self,
        path: PathBuf,
        kind: MediaKind,
        state: UploadState,
        task: Option<JoinHandle<Result<MediaRef, ApiError>>>,
    ) -> UploadId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(QueuedUpload {
            id,
            path,
            kind,
            state,
            task,
        });
        id
    }

    fn spawn(&self, kind: MediaKind, path: PathBuf) -> JoinHandle<Result<MediaRef, ApiError>> {
        let client = self.client.clone();
        let token = self.token.clone();
        tokio::spawn(async move { upload_media(&client, &token, kind, &path).await })
    }

    fn index_of(&self, id: UploadId) -> Result<usize, ApiError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ValidationError::Invalid(format!("Unknown upload {id}.")).into())
    }
}

fn settled_state(path: &Path, result: Result<MediaRef, ApiError>) -> UploadState {
    match result {
        Ok(media) => UploadState::Uploaded(media),
        Err(err) => {
            warn!("upload of {} failed: {err}", path.display());
            UploadState::Failed(err.user_message())
        }
    }
}
