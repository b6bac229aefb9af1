//! Data models for packjob.
//!
//! These structs match the JSON shapes exchanged with the pack API:
//! request bodies for the enqueue call and the payloads carried by
//! job stream events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque job identifier returned by the server on enqueue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job execution status as reported in `result` and `status` events.
///
/// Unknown values are preserved verbatim so failure messages can name them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// Forward-compatible fallback for statuses this client does not know
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s,
        }
    }

    /// Only `completed` counts as success.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress reported by a running job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub done: u32,
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressSnapshot {
    /// Completed fraction in `[0.0, 1.0]`; zero when the total is unknown.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.done) / f64::from(self.total)).min(1.0)
    }
}

/// Terminal payload of a `result` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub status: JobStatus,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A single sticker as sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerInput {
    pub source: String,
    pub id: String,
    pub emoji_list: Vec<String>,
}

/// Body of `POST /user/packs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePackRequest {
    pub pack_name: String,
    pub title: String,
    pub emotes: Vec<StickerInput>,
    pub has_watermark: bool,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerEmojiUpdate {
    pub id: String,
    pub emojis: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerPositionUpdate {
    pub id: String,
    pub position: u32,
}

/// Body of `PATCH /user/packs/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPackRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_is_public: Option<bool>,
    #[serde(default)]
    pub deleted_stickers: Vec<String>,
    #[serde(default)]
    pub added_stickers: Vec<StickerInput>,
    #[serde(default)]
    pub emoji_updates: Vec<StickerEmojiUpdate>,
    #[serde(default)]
    pub position_updates: Vec<StickerPositionUpdate>,
}

/// Pack summary returned by create and edit jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackPreview {
    pub id: i64,
    pub title: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePackResponse {
    pub pack_url: String,
    pub pack: PackPreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPackResponse {
    pub pack: PackPreview,
}
