use std::time::Duration;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a request.
    Submit(crate::ChatRequest),
    /// Server reported a pipeline stage for a submission.
    StageReached {
        submission: crate::SubmissionId,
        stage: crate::Stage,
        label: Option<String>,
        active_agents: Vec<String>,
    },
    /// Elapsed-time refresh from the submission's timer.
    TimerTick {
        submission: crate::SubmissionId,
        elapsed: Duration,
    },
    /// Terminal outcome of a submission.
    Completed {
        submission: crate::SubmissionId,
        outcome: Outcome,
    },
    /// User started a new conversation.
    NewConversation,
    /// User (or startup) asked for the backend status.
    HealthRequested,
    /// Result of a health check.
    HealthReported(crate::BackendStatus),
    /// UI/render tick to coalesce rendering.
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The request finished; `payload` is `None` when the stream ended
    /// without a result.
    Success {
        payload: Option<Value>,
        via_fallback: bool,
    },
    Failed { message: String },
}
