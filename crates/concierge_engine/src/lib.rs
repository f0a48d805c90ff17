//! Concierge engine: streaming chat client, fallback and effect execution.
mod decode;
mod engine;
mod fallback;
mod health;
mod persist;
mod settings;
mod stream;
mod types;

pub use decode::{decode_block, decode_data, DecodedFrame, FrameDecoder};
pub use engine::{ChannelProgressSink, EngineHandle};
pub use fallback::submit_with_fallback;
pub use health::check_health;
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use settings::{ClientSettings, CHAT_PATH, DEFAULT_BASE_URL, HEALTH_PATH, STREAM_PATH};
pub use stream::{ChatTransport, ProgressSink, ReqwestTransport};
pub use types::{
    ClientError, Completion, EngineEvent, FailureKind, HealthStatus, StageUpdate,
    StreamCompletion, StreamEvent, SubmissionId,
};
