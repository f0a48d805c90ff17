use std::time::Duration;

pub const STREAM_PATH: &str = "/api/chat/stream";
pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/api/health";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub stream_endpoint: String,
    pub chat_endpoint: String,
    pub health_endpoint: String,
    pub connect_timeout: Duration,
    /// Upper bound for a whole request, streaming included. Multi-agent runs
    /// against a real model routinely take over a minute.
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    /// Largest unterminated frame the decoder will buffer.
    pub max_frame_bytes: usize,
}

impl ClientSettings {
    /// Endpoints derived from the backend's base url, e.g. `http://localhost:8000`.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        Self {
            stream_endpoint: format!("{base}{STREAM_PATH}"),
            chat_endpoint: format!("{base}{CHAT_PATH}"),
            health_endpoint: format!("{base}{HEALTH_PATH}"),
            ..Self::default()
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            stream_endpoint: format!("{DEFAULT_BASE_URL}{STREAM_PATH}"),
            chat_endpoint: format!("{DEFAULT_BASE_URL}{CHAT_PATH}"),
            health_endpoint: format!("{DEFAULT_BASE_URL}{HEALTH_PATH}"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            health_timeout: Duration::from_secs(5),
            max_frame_bytes: 4 * 1024 * 1024,
        }
    }
}
