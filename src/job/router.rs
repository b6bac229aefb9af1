//! Event classification and routing.
//!
//! Maps a parsed `(event type, payload)` pair to a `TypedEvent`, then to the
//! action the session takes: report progress, keep reading, or resolve.

use serde_json::Value;
use tracing::debug;

use crate::job::JobError;
use crate::models::{JobResult, ProgressSnapshot};
use crate::sse::SseMessage;

/// A stream event after payload decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedEvent {
    Progress(ProgressSnapshot),
    /// Job status update; carried but not acted upon.
    Status(Value),
    Result(JobResult),
    Error(String),
    /// Unknown event type whose payload did not look like progress.
    Unclassified(String),
}

/// What the session does with one event.
#[derive(Debug, PartialEq)]
pub enum Route {
    Progress(ProgressSnapshot),
    Continue,
    Resolve(Result<Value, JobError>),
}

/// Decode the payload according to the event type.
///
/// # Errors
///
/// Returns `JobError::MalformedFrame` when a `progress` or `result` payload
/// does not parse. Other event types never fail; a non-JSON `error` payload is
/// taken as the message text.
pub fn classify(message: &SseMessage) -> Result<TypedEvent, JobError> {
    let payload = message.data.as_str();

    match message.event.as_str() {
        "progress" => serde_json::from_str(payload)
            .map(TypedEvent::Progress)
            .map_err(|e| malformed("progress", e)),
        "status" => Ok(TypedEvent::Status(
            serde_json::from_str(payload).unwrap_or_else(|_| Value::String(payload.to_string())),
        )),
        "result" => serde_json::from_str(payload)
            .map(TypedEvent::Result)
            .map_err(|e| malformed("result", e)),
        "error" => Ok(TypedEvent::Error(
            serde_json::from_str::<Value>(payload)
                .map(error_message)
                .unwrap_or_else(|_| payload.trim().to_string()),
        )),
        _ => Ok(progress_like(payload)
            .map(TypedEvent::Progress)
            .unwrap_or_else(|| TypedEvent::Unclassified(payload.to_string()))),
    }
}

/// Decide the session action for a decoded event.
pub fn route(event: TypedEvent) -> Route {
    match event {
        TypedEvent::Progress(snapshot) => Route::Progress(snapshot),
        TypedEvent::Status(status) => {
            debug!("Job status update: {}", status);
            Route::Continue
        }
        TypedEvent::Result(result) => Route::Resolve(resolve_result(result)),
        TypedEvent::Error(message) => Route::Resolve(Err(JobError::RemoteReportedError(message))),
        TypedEvent::Unclassified(raw) => {
            debug!("Ignoring unclassified event ({} bytes)", raw.len());
            Route::Continue
        }
    }
}

/// Classify and route in one step; decode failures resolve the session.
pub fn dispatch(message: &SseMessage) -> Route {
    match classify(message) {
        Ok(event) => route(event),
        Err(e) => Route::Resolve(Err(e)),
    }
}

fn resolve_result(result: JobResult) -> Result<Value, JobError> {
    if result.status.is_success() {
        return Ok(result.data.unwrap_or(Value::Null));
    }

    let message = result
        .error
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("job failed with status {}", result.status));
    Err(JobError::RemoteReportedError(message))
}

/// Best-effort reading of an unknown event as progress.
///
/// Only objects holding both `done` and `total` qualify.
fn progress_like(payload: &str) -> Option<ProgressSnapshot> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let object = value.as_object()?;
    if !object.contains_key("done") || !object.contains_key("total") {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Extract a human-readable message from an `error` payload.
fn error_message(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Object(ref map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn malformed(event: &str, err: serde_json::Error) -> JobError {
    JobError::MalformedFrame(format!("Failed to parse {} payload: {}", event, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn msg(event: &str, data: &str) -> SseMessage {
        SseMessage {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_progress_event() {
        let route = dispatch(&msg("progress", r#"{"done":3,"total":10}"#));
        assert_eq!(
            route,
            Route::Progress(ProgressSnapshot {
                done: 3,
                total: 10,
                message: None
            })
        );
    }

    #[test]
    fn test_progress_with_message() {
        let event = classify(&msg(
            "progress",
            r#"{"done":1,"total":2,"message":"Uploading sticker 1"}"#,
        ))
        .unwrap();
        match event {
            TypedEvent::Progress(p) => assert_eq!(p.message.as_deref(), Some("Uploading sticker 1")),
            other => panic!("Expected Progress, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_progress_is_terminal() {
        match dispatch(&msg("progress", "not json")) {
            Route::Resolve(Err(JobError::MalformedFrame(m))) => {
                assert!(m.contains("progress"), "unexpected message: {}", m)
            }
            other => panic!("Expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_status_is_ignored_even_if_unparseable() {
        let event = classify(&msg("status", r#"{"status":"queued","job_id":"j1"}"#)).unwrap();
        assert_eq!(event, TypedEvent::Status(json!({"status":"queued","job_id":"j1"})));
        assert_eq!(route(event), Route::Continue);

        assert_eq!(dispatch(&msg("status", "garbage")), Route::Continue);
    }

    #[test]
    fn test_completed_result() {
        let route = dispatch(&msg(
            "result",
            r#"{"status":"completed","data":{"pack_url":"x"}}"#,
        ));
        assert_eq!(route, Route::Resolve(Ok(json!({"pack_url": "x"}))));
    }

    #[test]
    fn test_failed_result_without_error_uses_generic_message() {
        match dispatch(&msg("result", r#"{"status":"failed"}"#)) {
            Route::Resolve(Err(JobError::RemoteReportedError(m))) => {
                assert_eq!(m, "job failed with status failed")
            }
            other => panic!("Expected RemoteReportedError, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_result_with_error() {
        match dispatch(&msg(
            "result",
            r#"{"status":"failed","error":"Job was cancelled"}"#,
        )) {
            Route::Resolve(Err(JobError::RemoteReportedError(m))) => {
                assert_eq!(m, "Job was cancelled")
            }
            other => panic!("Expected RemoteReportedError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_result_is_failure() {
        let event = classify(&msg("result", r#"{"status":"archived"}"#)).unwrap();
        assert_eq!(
            event,
            TypedEvent::Result(JobResult {
                status: JobStatus::Other("archived".to_string()),
                data: None,
                error: None,
            })
        );
        match route(event) {
            Route::Resolve(Err(e)) => assert_eq!(e.to_string(), "job failed with status archived"),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_result_is_terminal() {
        assert!(matches!(
            dispatch(&msg("result", r#"{"data":1}"#)),
            Route::Resolve(Err(JobError::MalformedFrame(_)))
        ));
    }

    #[test]
    fn test_error_event_payload_forms() {
        let cases = [
            (r#""Job not found""#, "Job not found"),
            (r#"{"message":"Pack is locked"}"#, "Pack is locked"),
            (r#"{"error":"Telegram API unavailable"}"#, "Telegram API unavailable"),
            (r#"{"code":7}"#, r#"{"code":7}"#),
            ("42", "42"),
        ];
        for (payload, expected) in cases {
            match dispatch(&msg("error", payload)) {
                Route::Resolve(Err(JobError::RemoteReportedError(m))) => {
                    assert_eq!(m, expected, "payload {}", payload)
                }
                other => panic!("Expected RemoteReportedError for {}, got {:?}", payload, other),
            }
        }
    }

    #[test]
    fn test_plain_text_error_is_the_message() {
        assert_eq!(
            dispatch(&msg("error", "Job not found")),
            Route::Resolve(Err(JobError::RemoteReportedError(
                "Job not found".to_string()
            )))
        );
        assert_eq!(
            dispatch(&msg("error", "{not json")),
            Route::Resolve(Err(JobError::RemoteReportedError("{not json".to_string())))
        );
    }

    #[test]
    fn test_unknown_event_reparsed_as_progress() {
        let route = dispatch(&msg("message", r#"{"done":2,"total":5,"message":"resizing"}"#));
        assert_eq!(
            route,
            Route::Progress(ProgressSnapshot {
                done: 2,
                total: 5,
                message: Some("resizing".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_event_ignored_otherwise() {
        for payload in [r#"{"done":2}"#, r#"{"done":"a","total":"b"}"#, "[1,2]", "hello"] {
            let event = classify(&msg("heartbeat", payload)).unwrap();
            assert_eq!(event, TypedEvent::Unclassified(payload.to_string()));
            assert_eq!(route(event), Route::Continue);
        }
    }
}
