#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the request to the backend, streaming first.
    OpenStream {
        submission: crate::SubmissionId,
        request: crate::ChatRequest,
    },
    /// Capture the start time and begin elapsed-time ticks.
    StartTimer { submission: crate::SubmissionId },
    /// Stop the elapsed-time ticks. Emitted once per submission.
    StopTimer { submission: crate::SubmissionId },
    /// Abandon the submission's network work.
    CancelSubmission { submission: crate::SubmissionId },
    /// Query the backend health endpoint.
    CheckHealth,
}
