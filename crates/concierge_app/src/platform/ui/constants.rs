pub const STEP_DONE: &str = "✔";
pub const STEP_ACTIVE: &str = "●";
pub const STEP_PENDING: &str = "○";

pub const PROMPT: &str = "> ";
pub const USER_HEADING: &str = "── you ──";
pub const ASSISTANT_HEADING: &str = "── concierge ──";

pub const CMD_NEW: &str = "/new";
pub const CMD_HEALTH: &str = "/health";
pub const CMD_QUIT: &str = "/quit";
pub const CMD_HELP: &str = "/help";

pub const HELP_TEXT: &str =
    "Type a request and press enter. /new starts over, /health checks the backend, /quit exits.";

pub const PAGE_TITLE: &str = "Concierge conversation";
