//! HTTP client for pack jobs.
//!
//! This module provides `PackClient`, which submits pack creation and edit
//! requests to the API, follows the resulting job over its event stream and
//! returns the final payload.

use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::job::session::{JobSession, ProgressSink};
use crate::job::JobError;
use crate::models::{
    CreatePackRequest, CreatePackResponse, EditPackRequest, EditPackResponse, JobHandle,
};

/// Response fields that may carry the job id, in lookup order.
const JOB_ID_FIELDS: [&str; 3] = ["job_id", "jobId", "id"];

const EVENT_STREAM: &str = "text/event-stream";

/// Client for the pack job API.
///
/// Cheap to clone; clones share the underlying connection pool. Every call
/// to `run_job` (or the typed wrappers) is an independent job session.
///
/// # Example
///
/// ```ignore
/// use packjob::{ClientConfig, PackClient, ProgressSnapshot};
///
/// let client = PackClient::new(ClientConfig::from_env()?)?;
/// let created = client
///     .create_pack(&request, |p: &ProgressSnapshot| println!("{}/{}", p.done, p.total))
///     .await?;
/// println!("{}", created.pack_url);
/// ```
#[derive(Debug, Clone)]
pub struct PackClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PackClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns `JobError::InvalidRequest` if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialization fails).
    pub fn new(config: ClientConfig) -> Result<Self, JobError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| JobError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(http, config))
    }

    /// Reuse an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a new sticker pack (`POST /user/packs`).
    pub async fn create_pack<P: ProgressSink>(
        &self,
        request: &CreatePackRequest,
        progress: P,
    ) -> Result<CreatePackResponse, JobError> {
        self.run_job(Method::POST, "/user/packs", request, progress)
            .await
    }

    /// Edit an existing sticker pack (`PATCH /user/packs/{name}`).
    ///
    /// # Errors
    ///
    /// Returns `JobError::InvalidRequest` without contacting the server if
    /// `name` is not a valid pack name (ASCII letters, digits, underscores).
    pub async fn edit_pack<P: ProgressSink>(
        &self,
        name: &str,
        request: &EditPackRequest,
        progress: P,
    ) -> Result<EditPackResponse, JobError> {
        if !is_valid_pack_name(name) {
            return Err(JobError::InvalidRequest(format!("Invalid pack name: {:?}", name)));
        }

        self.run_job(Method::PATCH, &format!("/user/packs/{}", name), request, progress)
            .await
    }

    /// Submit a job and follow it to its outcome.
    ///
    /// This method:
    /// 1. Sends `body` as JSON to `path` and reads the job id
    /// 2. Opens `GET /job/{id}` as an event stream
    /// 3. Reports progress events to `progress` in arrival order
    /// 4. Decodes the `data` of a completed result into `T`
    ///
    /// # Errors
    ///
    /// Any `JobError`; see its variants. Nothing is retried.
    pub async fn run_job<T, B, P>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        progress: P,
    ) -> Result<T, JobError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        P: ProgressSink,
    {
        let mut session = JobSession::new(progress);

        let job = match self.enqueue(method, path, body).await {
            Ok(job) => job,
            Err(e) => return session.resolve(Err(e)),
        };
        session.submitted(job.clone());

        let response = match self.open_stream(&job).await {
            Ok(response) => response,
            Err(e) => return session.resolve(Err(e)),
        };

        let outcome = session
            .stream(response.bytes_stream(), self.config.job_timeout)
            .await;
        session.resolve(outcome)
    }

    /// Send the enqueue request and return the job id.
    ///
    /// # Errors
    ///
    /// - `JobError::SubmissionRejected` on a non-success status
    /// - `JobError::MissingJobId` if the body has no usable id field
    /// - `JobError::Transport` if the request fails
    pub async fn enqueue<B>(&self, method: Method, path: &str, body: &B) -> Result<JobHandle, JobError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        info!("Enqueueing job: {} {}", method, url);

        let response = self.request(method, &url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = rejection_body(response).await;
            return Err(JobError::SubmissionRejected {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let text = response.text().await?;
        let job = extract_job_id(&text).ok_or(JobError::MissingJobId)?;
        info!(job_id = %job, "Job enqueued");
        Ok(job)
    }

    /// Open the job's event stream.
    ///
    /// # Errors
    ///
    /// Returns `JobError::StreamOpenRejected` on a non-success status.
    pub async fn open_stream(&self, job: &JobHandle) -> Result<reqwest::Response, JobError> {
        let url = self
            .config
            .job_url(job.as_str())
            .map_err(|e| JobError::InvalidRequest(e.to_string()))?;
        debug!("Opening job stream: {}", url);

        let response = self
            .request(Method::GET, url.as_str())
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = rejection_body(response).await;
            return Err(JobError::StreamOpenRejected {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        Ok(response)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.config.session_token {
            Some(token) => builder.header(COOKIE, format!("jwt={}", token)),
            None => builder,
        }
    }
}

/// Body of a rejected response, or empty if it cannot be read.
async fn rejection_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) => text,
        Err(e) => {
            debug!("Failed to read {} response body: {}", status, e);
            String::new()
        }
    }
}

/// Read the job id from an enqueue response body.
///
/// Checks `job_id`, `jobId`, then `id`; string and integer values are
/// accepted, empty strings are not.
pub fn extract_job_id(body: &str) -> Option<JobHandle> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    JOB_ID_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find_map(|id| match id {
            Value::String(s) if !s.trim().is_empty() => Some(JobHandle::new(s.trim())),
            Value::Number(n) => Some(JobHandle::new(n.to_string())),
            _ => None,
        })
}

/// Build a readable message from a failed response.
///
/// Prefers a JSON `message` field, then the raw body, then the status
/// reason phrase.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

/// Telegram sticker set names: ASCII letters, digits and underscores.
fn is_valid_pack_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
