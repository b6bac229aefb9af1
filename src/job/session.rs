//! Job session state machine.
//!
//! A session tracks one submitted job from enqueue to its single outcome:
//!
//! ```text
//! Submitting ──► StreamOpening ──► Streaming ──► Resolved
//!      │               │                            ▲
//!      └───────────────┴────────────────────────────┘
//!                    (failure at any step)
//! ```
//!
//! The byte stream is moved into `stream()` and dropped when it returns, so
//! the reader is always released before the outcome is handed back.
//! `resolve()` consumes the session, which makes a second resolution
//! impossible.

use std::time::Duration;

use futures_util::{pin_mut, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::job::router::{dispatch, Route};
use crate::job::JobError;
use crate::models::{JobHandle, ProgressSnapshot};
use crate::sse::{parse_frame, FrameAssembler};

/// Receiver of intermediate progress.
///
/// Closures taking `&ProgressSnapshot` implement this; pass `NoProgress`
/// to opt out.
pub trait ProgressSink {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressSnapshot),
{
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Progress sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// Lifecycle state of a job session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Submitting,
    StreamOpening,
    Streaming,
    Resolved,
}

/// One job from submission to outcome.
pub struct JobSession<P> {
    state: SessionState,
    job: Option<JobHandle>,
    progress: P,
}

impl<P: ProgressSink> JobSession<P> {
    pub fn new(progress: P) -> Self {
        Self {
            state: SessionState::Submitting,
            job: None,
            progress,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    /// Record the job id returned by the enqueue call.
    pub fn submitted(&mut self, job: JobHandle) {
        debug_assert_eq!(self.state, SessionState::Submitting);
        debug!("Job {} enqueued", job);
        self.job = Some(job);
        self.state = SessionState::StreamOpening;
    }

    /// Read the job's event stream until it produces an outcome.
    ///
    /// Returns on the first terminal event, decode failure, transport error,
    /// or end of stream. With a `limit`, the read loop races a timer and
    /// expiry yields `JobError::Timeout`. Either way the stream is dropped
    /// and the session is `Resolved` when this returns.
    pub async fn stream<S, B, E>(
        &mut self,
        stream: S,
        limit: Option<Duration>,
    ) -> Result<Value, JobError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<JobError>,
    {
        self.state = SessionState::Streaming;

        let outcome = match limit {
            Some(limit) => tokio::time::timeout(limit, self.read_events(stream))
                .await
                .unwrap_or_else(|_| Err(JobError::Timeout(limit))),
            None => self.read_events(stream).await,
        };
        self.state = SessionState::Resolved;
        outcome
    }

    async fn read_events<S, B, E>(&mut self, stream: S) -> Result<Value, JobError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<JobError>,
    {
        pin_mut!(stream);
        let mut assembler = FrameAssembler::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return Err(e.into()),
            };

            for frame in assembler.push(chunk.as_ref())? {
                let Some(message) = parse_frame(&frame) else {
                    continue;
                };

                debug!(event = %message.event, "Routing job event");
                match dispatch(&message) {
                    Route::Progress(snapshot) => self.progress.on_progress(&snapshot),
                    Route::Continue => {}
                    Route::Resolve(outcome) => return outcome,
                }
            }
        }

        if let Some(tail) = assembler.finish() {
            warn!("Job stream closed mid-frame ({} bytes unterminated)", tail.len());
        }
        Err(JobError::StreamEndedPrematurely)
    }

    /// Produce the session's outcome, decoding a success payload into `T`.
    ///
    /// Failures before streaming resolve here directly; the session is
    /// consumed either way.
    pub fn resolve<T: DeserializeOwned>(
        self,
        outcome: Result<Value, JobError>,
    ) -> Result<T, JobError> {
        let job = self
            .job
            .as_ref()
            .map(JobHandle::to_string)
            .unwrap_or_else(|| "<unsubmitted>".to_string());

        let outcome = outcome.and_then(|data| {
            serde_json::from_value(data).map_err(|e| {
                JobError::MalformedFrame(format!("Failed to parse result data: {}", e))
            })
        });

        match &outcome {
            Ok(_) => info!("Job {} completed", job),
            Err(e) => warn!("Job {} failed: {}", job, e),
        }
        outcome
    }
}
