use crate::progress::{ProgressIndicator, Stage};
use crate::render::render_user_message;
use crate::view_model::{AppViewModel, ProgressView, StepView};

pub type SubmissionId = u64;

/// Whether a submission is currently running. Only one may be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    InFlight { submission: SubmissionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Last known backend status, shown outside the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub healthy: bool,
    pub summary: String,
}

/// One rendered transcript item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    lifecycle: Lifecycle,
    last_submission: SubmissionId,
    progress: Option<ProgressIndicator>,
    transcript: Vec<TranscriptEntry>,
    backend: Option<BackendStatus>,
    rejected_submissions: u32,
    discarded_events: u32,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            busy: matches!(self.lifecycle, Lifecycle::InFlight { .. }),
            progress: self.progress.as_ref().map(|progress| ProgressView {
                steps: Stage::ALL
                    .iter()
                    .map(|stage| StepView {
                        stage: *stage,
                        status: progress.status_of(*stage),
                    })
                    .collect(),
                label: progress.label().map(ToOwned::to_owned),
                routed_agents: progress.routed_agents().to_vec(),
                elapsed: progress.elapsed(),
            }),
            transcript: self.transcript.clone(),
            backend: self.backend.clone(),
            rejected_submissions: self.rejected_submissions,
            discarded_events: self.discarded_events,
            dirty: self.dirty,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Latest health report, if one has arrived.
    pub fn backend(&self) -> Option<&BackendStatus> {
        self.backend.as_ref()
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, submission: SubmissionId) -> bool {
        self.lifecycle == Lifecycle::InFlight { submission }
    }

    pub(crate) fn begin_submission(&mut self, message: &str) -> SubmissionId {
        self.last_submission += 1;
        let submission = self.last_submission;
        self.lifecycle = Lifecycle::InFlight { submission };
        self.progress = Some(ProgressIndicator::new());
        self.transcript.push(TranscriptEntry {
            role: Role::User,
            html: render_user_message(message),
        });
        self.dirty = true;
        submission
    }

    pub(crate) fn progress_mut(&mut self) -> Option<&mut ProgressIndicator> {
        self.dirty = true;
        self.progress.as_mut()
    }

    /// Ends the in-flight submission: the progress region goes away and the
    /// terminal fragment joins the transcript.
    pub(crate) fn finish(&mut self, html: String) {
        self.lifecycle = Lifecycle::Idle;
        self.progress = None;
        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            html,
        });
        self.dirty = true;
    }

    /// Clears the transcript and abandons any in-flight submission, which is
    /// returned so its work can be cancelled.
    pub(crate) fn clear_conversation(&mut self) -> Option<SubmissionId> {
        let abandoned = match self.lifecycle {
            Lifecycle::InFlight { submission } => Some(submission),
            Lifecycle::Idle => None,
        };
        self.lifecycle = Lifecycle::Idle;
        self.progress = None;
        self.transcript.clear();
        self.dirty = true;
        abandoned
    }

    pub(crate) fn set_backend(&mut self, status: BackendStatus) {
        if self.backend.as_ref() != Some(&status) {
            self.backend = Some(status);
            self.dirty = true;
        }
    }

    pub(crate) fn record_rejected(&mut self) {
        self.rejected_submissions += 1;
        self.dirty = true;
    }

    pub(crate) fn record_discarded(&mut self) {
        self.discarded_events += 1;
    }
}
