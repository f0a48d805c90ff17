use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub type SubmissionId = u64;

/// Stage notification decoded from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageUpdate {
    /// Stage name exactly as the server sent it.
    pub name: String,
    pub label: Option<String>,
    /// Routing decision, sent along with the first stage.
    pub active_agents: Vec<String>,
}

/// One meaningful stream event. When a frame carries several fields, `error`
/// wins over `result`, which wins over `stage`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Stage(StageUpdate),
    Result(Value),
    Error(String),
}

impl StreamEvent {
    /// Interprets a decoded frame. Frames with nothing to act on yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        // Only a non-empty message or a non-empty structured error counts.
        // Bare scalars such as `0` or `true` carry no message and are ignored.
        match object.get("error") {
            Some(Value::String(message)) if !message.is_empty() => {
                return Some(StreamEvent::Error(message.clone()));
            }
            Some(structured @ Value::Object(fields)) if !fields.is_empty() => {
                return Some(StreamEvent::Error(structured.to_string()));
            }
            Some(structured @ Value::Array(items)) if !items.is_empty() => {
                return Some(StreamEvent::Error(structured.to_string()));
            }
            _ => {}
        }

        if let Some(result) = object.get("result").filter(|result| !result.is_null()) {
            return Some(StreamEvent::Result(result.clone()));
        }

        let name = object
            .get("stage")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())?;
        Some(StreamEvent::Stage(StageUpdate {
            name: name.to_string(),
            label: object
                .get("label")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            active_agents: object
                .get("active_agents")
                .and_then(Value::as_array)
                .map(|agents| {
                    agents
                        .iter()
                        .filter_map(Value::as_str)
                        .map(ToOwned::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
        }))
    }
}

/// How a stream ended without error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamCompletion {
    Result(Value),
    /// The stream closed cleanly without ever sending a result.
    NoOutput,
}

/// Terminal success of a submission, from either path.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub payload: Option<Value>,
    pub via_fallback: bool,
}

/// Backend health as reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub api_key_set: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub default_provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Stage {
        submission: SubmissionId,
        update: StageUpdate,
    },
    Completed {
        submission: SubmissionId,
        result: Result<Completion, ClientError>,
    },
    Health(Result<HealthStatus, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text to show the user. Server-provided text is shown as is.
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Server | FailureKind::HttpStatus(_) => self.message.clone(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The server could not be reached or the connection broke.
    Network,
    Timeout,
    HttpStatus(u16),
    /// The server reported an error inside the stream.
    Server,
    /// The stream violated the framing rules.
    Protocol,
    /// A response body that should be JSON was not.
    Decode,
    Encode,
}

impl FailureKind {
    /// Faults that warrant the single non-streaming retry.
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, FailureKind::Network)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Server => write!(f, "server error"),
            FailureKind::Protocol => write!(f, "protocol error"),
            FailureKind::Decode => write!(f, "invalid response body"),
            FailureKind::Encode => write!(f, "invalid request body"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_wins_over_result_and_stage() {
        let event = StreamEvent::from_value(&json!({"stage": "done", "result": {}, "error": "boom"}));
        assert_eq!(event, Some(StreamEvent::Error("boom".to_string())));
    }

    #[test]
    fn result_wins_over_stage() {
        let event = StreamEvent::from_value(&json!({"stage": "done", "result": {"a": 1}}));
        assert_eq!(event, Some(StreamEvent::Result(json!({"a": 1}))));
    }

    #[test]
    fn stage_carries_label_and_agents() {
        let event = StreamEvent::from_value(&json!({
            "stage": "classifying",
            "label": "Analyzing your query...",
            "active_agents": ["travel", 3, "financial"]
        }));
        assert_eq!(
            event,
            Some(StreamEvent::Stage(StageUpdate {
                name: "classifying".to_string(),
                label: Some("Analyzing your query...".to_string()),
                active_agents: vec!["travel".to_string(), "financial".to_string()],
            }))
        );
    }

    #[test]
    fn empty_or_non_object_frames_are_nothing() {
        assert_eq!(StreamEvent::from_value(&json!({})), None);
        assert_eq!(StreamEvent::from_value(&json!({"error": "", "result": null})), None);
        assert_eq!(StreamEvent::from_value(&json!([1, 2])), None);
        assert_eq!(StreamEvent::from_value(&json!("ping")), None);
    }

    #[test]
    fn scalar_error_values_are_ignored() {
        for error in [json!(0), json!(0.0), json!(1), json!(true), json!(false), json!({}), json!([])] {
            let event = StreamEvent::from_value(&json!({"error": error, "stage": "fetching"}));
            assert!(
                matches!(event, Some(StreamEvent::Stage(ref update)) if update.name == "fetching"),
                "error value {error} should be ignored, got {event:?}"
            );
        }
        assert_eq!(
            StreamEvent::from_value(&json!({"error": 0, "result": {"ok": 1}})),
            Some(StreamEvent::Result(json!({"ok": 1})))
        );
    }

    #[test]
    fn structured_error_is_kept_as_text() {
        let event = StreamEvent::from_value(&json!({"error": {"code": 500}}));
        assert_eq!(event, Some(StreamEvent::Error(r#"{"code":500}"#.to_string())));
    }

    #[test]
    fn only_network_faults_fall_back() {
        assert!(FailureKind::Network.is_transport_fault());
        assert!(!FailureKind::Server.is_transport_fault());
        assert!(!FailureKind::Timeout.is_transport_fault());
        assert!(!FailureKind::HttpStatus(502).is_transport_fault());
    }
}
