//! Concierge core: pure state machine, typed result model and HTML rendering.
mod effect;
pub mod model;
mod msg;
mod progress;
pub mod render;
mod request;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{AgentKind, AgentOutput, ResultPayload, Risk};
pub use msg::{Msg, Outcome};
pub use progress::{ProgressIndicator, Stage, StepStatus};
pub use render::{render_agent, render_error, render_payload, render_result, NO_OUTPUT};
pub use request::{default_model, ChatRequest, Profile, ProfileForm};
pub use state::{AppState, BackendStatus, Lifecycle, Role, SubmissionId, TranscriptEntry};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, StepView};
