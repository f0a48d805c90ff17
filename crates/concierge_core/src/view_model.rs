use std::time::Duration;

use crate::{BackendStatus, Stage, StepStatus, TranscriptEntry};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// A submission is in flight; the submit control is disabled.
    pub busy: bool,
    /// Present only while a submission is in flight.
    pub progress: Option<ProgressView>,
    pub transcript: Vec<TranscriptEntry>,
    pub backend: Option<BackendStatus>,
    pub rejected_submissions: u32,
    pub discarded_events: u32,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub steps: Vec<StepView>,
    pub label: Option<String>,
    pub routed_agents: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepView {
    pub stage: Stage,
    pub status: StepStatus,
}
