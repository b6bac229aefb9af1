//! Frame-to-event parsing.
//!
//! Turns one complete frame into its event type and joined data payload.
//! Only the `event` and `data` fields matter to job streams; `id`, `retry`
//! and comment lines are accepted and ignored.

/// Event type used when a frame carries no `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// One parsed stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub event: String,
    pub data: String,
}

/// Parse a frame produced by `FrameAssembler`.
///
/// Returns `None` when the joined payload is empty, which covers keep-alive
/// comments and frames with no `data:` lines.
///
/// # Example
///
/// ```ignore
/// let msg = parse_frame("event: progress\ndata: {\"done\":1,\"total\":2}").unwrap();
/// assert_eq!(msg.event, "progress");
/// ```
pub fn parse_frame(frame: &str) -> Option<SseMessage> {
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.starts_with(':') {
            continue;
        }

        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim_start());
        }
    }

    let data = data_lines.join("\n");
    if data.is_empty() {
        return None;
    }

    let event = event
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string());

    Some(SseMessage { event, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_and_data() {
        let msg = parse_frame("event: progress\ndata: {\"done\":3,\"total\":10}").unwrap();
        assert_eq!(msg.event, "progress");
        assert_eq!(msg.data, "{\"done\":3,\"total\":10}");
    }

    #[test]
    fn test_default_event_type() {
        let msg = parse_frame("data: hello").unwrap();
        assert_eq!(msg.event, DEFAULT_EVENT_TYPE);
        assert_eq!(msg.data, "hello");
    }

    #[test]
    fn test_no_data_lines_produces_nothing() {
        assert_eq!(parse_frame("event: status"), None);
        assert_eq!(parse_frame(": keep-alive"), None);
        assert_eq!(parse_frame(""), None);
    }

    #[test]
    fn test_empty_data_produces_nothing() {
        assert_eq!(parse_frame("event: progress\ndata:"), None);
        assert_eq!(parse_frame("data:   "), None);
    }

    #[test]
    fn test_multiple_data_lines_join_in_order() {
        let msg = parse_frame("event: result\ndata: first\ndata: second\ndata:third").unwrap();
        assert_eq!(msg.data, "first\nsecond\nthird");
    }

    #[test]
    fn test_crlf_lines() {
        let msg = parse_frame("event: error\r\ndata: \"boom\"\r\n").unwrap();
        assert_eq!(msg.event, "error");
        assert_eq!(msg.data, "\"boom\"");
    }

    #[test]
    fn test_leading_whitespace_trimmed_trailing_kept() {
        let msg = parse_frame("data:\t  padded  ").unwrap();
        assert_eq!(msg.data, "padded  ");
    }

    #[test]
    fn test_ignores_other_fields_and_comments() {
        let msg = parse_frame(": comment\nid: 42\nretry: 1000\nevent: status\ndata: {}").unwrap();
        assert_eq!(msg.event, "status");
        assert_eq!(msg.data, "{}");
    }

    #[test]
    fn test_last_event_line_wins() {
        let msg = parse_frame("event: status\nevent: progress\ndata: {}").unwrap();
        assert_eq!(msg.event, "progress");
    }
}
