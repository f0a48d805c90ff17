use concierge_core::{AppViewModel, BackendStatus, ProgressView, Role, StepStatus};

use super::constants::*;

/// One terminal side effect produced from a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    ClearTranscript,
    PrintEntry { role: Role, html: String },
    ShowProgress(String),
    ClearProgress,
    ShowStatus(String),
}

/// What the terminal already shows, so each render only emits the difference.
#[derive(Debug, Default)]
pub struct RenderCursor {
    printed: usize,
    progress_shown: bool,
    backend: Option<BackendStatus>,
    rejected: u32,
}

pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    if view.transcript.len() < cursor.printed {
        cmds.push(TerminalCommand::ClearTranscript);
        cursor.printed = 0;
    }

    if cursor.progress_shown && (view.progress.is_none() || view.transcript.len() > cursor.printed) {
        cmds.push(TerminalCommand::ClearProgress);
        cursor.progress_shown = false;
    }

    for entry in &view.transcript[cursor.printed..] {
        cmds.push(TerminalCommand::PrintEntry {
            role: entry.role,
            html: entry.html.clone(),
        });
    }
    cursor.printed = view.transcript.len();

    if view.backend != cursor.backend {
        if let Some(status) = &view.backend {
            cmds.push(TerminalCommand::ShowStatus(status.summary.clone()));
        }
        cursor.backend = view.backend.clone();
    }

    if view.rejected_submissions > cursor.rejected {
        cmds.push(TerminalCommand::ShowStatus(
            "Still working on the previous request; /new abandons it.".to_string(),
        ));
        cursor.rejected = view.rejected_submissions;
    }

    if let Some(progress) = &view.progress {
        cmds.push(TerminalCommand::ShowProgress(progress_line(progress)));
        cursor.progress_shown = true;
    }

    cmds
}

/// Single-line step indicator, e.g. `✔ Classifying query  ● Fetching evidence ... 2.4s`.
pub fn progress_line(progress: &ProgressView) -> String {
    let steps: Vec<String> = progress
        .steps
        .iter()
        .map(|step| {
            let glyph = match step.status {
                StepStatus::Done => STEP_DONE,
                StepStatus::Active => STEP_ACTIVE,
                StepStatus::Pending => STEP_PENDING,
            };
            format!("{glyph} {}", step.stage.label())
        })
        .collect();

    let mut line = format!(
        "{}  {:.1}s",
        steps.join("  "),
        progress.elapsed.as_secs_f64()
    );
    if let Some(label) = &progress.label {
        line.push_str(&format!("  {label}"));
    }
    if !progress.routed_agents.is_empty() {
        line.push_str(&format!("  Routing to: {}", progress.routed_agents.join(", ")));
    }
    line
}
