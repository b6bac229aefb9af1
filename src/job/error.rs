//! Failure side of a job outcome.

use std::time::Duration;

use thiserror::Error;

/// Job-specific error types.
///
/// Every path out of a job session ends in exactly one of these or in the
/// success payload. None of them are retried internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    /// The enqueue call returned a non-success status.
    #[error("Submission rejected ({status}): {message}")]
    SubmissionRejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The enqueue response carried no recognizable job identifier.
    #[error("Server response did not include a job id")]
    MissingJobId,

    /// The event stream request returned a non-success status.
    #[error("Job stream rejected ({status}): {message}")]
    StreamOpenRejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A `progress`, `result` or `error` payload could not be decoded.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// The server reported the job as failed.
    #[error("{0}")]
    RemoteReportedError(String),

    /// The stream closed before a terminal event arrived.
    #[error("stream ended without result")]
    StreamEndedPrematurely,

    /// Network failure while reading the stream or sending a request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The job did not finish within the configured timeout.
    #[error("Job timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl JobError {
    /// Whether the server itself declared the failure, as opposed to the
    /// transport or this client.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            JobError::SubmissionRejected { .. }
                | JobError::StreamOpenRejected { .. }
                | JobError::RemoteReportedError(_)
        )
    }
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            JobError::InvalidRequest(err.to_string())
        } else {
            JobError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_display() {
        let err = JobError::SubmissionRejected {
            status: 409,
            message: "Pack name already taken".to_string(),
        };
        assert_eq!(err.to_string(), "Submission rejected (409): Pack name already taken");

        assert_eq!(
            JobError::StreamEndedPrematurely.to_string(),
            "stream ended without result"
        );

        let remote = JobError::RemoteReportedError("job failed with status failed".to_string());
        assert_eq!(remote.to_string(), "job failed with status failed");

        let timeout = JobError::Timeout(Duration::from_secs(90));
        assert_eq!(timeout.to_string(), "Job timed out after 90s");
    }

    #[test]
    fn test_is_remote() {
        assert!(JobError::RemoteReportedError("x".to_string()).is_remote());
        assert!(JobError::StreamOpenRejected {
            status: 404,
            message: "Job not found".to_string()
        }
        .is_remote());
        assert!(!JobError::StreamEndedPrematurely.is_remote());
        assert!(!JobError::Transport("reset".to_string()).is_remote());
        assert!(!JobError::MalformedFrame("bad".to_string()).is_remote());
    }
}
