//! Data entries collected against projects, with their attached media.

pub mod client;
pub mod types;
pub mod uploads;

pub use self::{
    client::{
        create_entry, delete_entry, fetch_stats, get_entry, list_entries, submit_entry,
        update_entry,
    },
    types::{DataEntry, EntryDraft, EntryStats, MediaKind, MediaRef},
    uploads::{upload_media, UploadId, UploadQueue, UploadState, UploadStatus},
};
