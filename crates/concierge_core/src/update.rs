use crate::render::{render_error, render_payload};
use crate::{AppState, Effect, Lifecycle, Msg, Outcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submit(request) => {
            let Some(message) = request.message().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            if let Lifecycle::InFlight { .. } = state.lifecycle() {
                // One submission at a time; later ones are dropped, not queued.
                state.record_rejected();
                return (state, Vec::new());
            }
            let submission = state.begin_submission(&message);
            vec![
                Effect::StartTimer { submission },
                Effect::OpenStream {
                    submission,
                    request,
                },
            ]
        }
        Msg::StageReached {
            submission,
            stage,
            label,
            active_agents,
        } => {
            if state.is_current(submission) {
                if let Some(progress) = state.progress_mut() {
                    progress.advance(stage, label, active_agents);
                }
            } else {
                state.record_discarded();
            }
            Vec::new()
        }
        Msg::TimerTick {
            submission,
            elapsed,
        } => {
            if state.is_current(submission) {
                if let Some(progress) = state.progress_mut() {
                    progress.set_elapsed(elapsed);
                }
            }
            Vec::new()
        }
        Msg::Completed {
            submission,
            outcome,
        } => {
            if !state.is_current(submission) {
                // Superseded or cancelled; the transcript it belonged to is gone.
                state.record_discarded();
                return (state, Vec::new());
            }
            let html = match outcome {
                Outcome::Success { payload, .. } => render_payload(payload.as_ref()),
                Outcome::Failed { message } => render_error(&message),
            };
            state.finish(html);
            vec![Effect::StopTimer { submission }]
        }
        Msg::NewConversation => match state.clear_conversation() {
            Some(submission) => vec![
                Effect::CancelSubmission { submission },
                Effect::StopTimer { submission },
            ],
            None => Vec::new(),
        },
        Msg::HealthRequested => vec![Effect::CheckHealth],
        Msg::HealthReported(status) => {
            state.set_backend(status);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
