use std::time::Duration;

/// Pipeline stages as shown by the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Classifying = 0,
    Fetching = 1,
    Processing = 2,
    Done = 3,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Classifying,
        Stage::Fetching,
        Stage::Processing,
        Stage::Done,
    ];

    /// Maps a stage name sent by the server. Names are matched exactly;
    /// anything else counts as processing.
    pub fn from_server_name(name: &str) -> Self {
        match name {
            "classifying" => Stage::Classifying,
            "fetching" => Stage::Fetching,
            "done" => Stage::Done,
            _ => Stage::Processing,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Classifying => "Classifying query",
            Stage::Fetching => "Fetching evidence",
            Stage::Processing => "Running agents",
            Stage::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Done,
}

/// Four-step indicator of the in-flight submission.
///
/// Steps below the current stage are done and the current one is active. A
/// stage that goes backwards simply becomes the active step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressIndicator {
    current: Option<Stage>,
    label: Option<String>,
    routed_agents: Vec<String>,
    elapsed: Duration,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, stage: Stage, label: Option<String>, routed_agents: Vec<String>) {
        self.current = Some(stage);
        if label.is_some() {
            self.label = label;
        }
        if !routed_agents.is_empty() {
            self.routed_agents = routed_agents;
        }
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn routed_agents(&self) -> &[String] {
        &self.routed_agents
    }

    pub fn status_of(&self, stage: Stage) -> StepStatus {
        match self.current {
            Some(current) if stage.index() < current.index() => StepStatus::Done,
            Some(current) if stage == current => StepStatus::Active,
            _ => StepStatus::Pending,
        }
    }
}
