use std::path::PathBuf;

use clap::Parser;

/// Terminal client for the multi-agent concierge backend
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Ask one question and exit once it is answered; omit for an interactive session
    pub message: Option<String>,

    /// Configuration file path (RON format)
    #[clap(long, default_value = "concierge.ron")]
    pub config: PathBuf,

    /// Backend base url, e.g. http://localhost:8000
    #[clap(long)]
    pub server: Option<String>,

    /// LLM provider: grok, openai_compatible or stub
    #[clap(long)]
    pub provider: Option<String>,

    /// Model name; defaults to the provider's default model
    #[clap(long)]
    pub model: Option<String>,

    /// Seed url for evidence gathering (repeatable)
    #[clap(long = "seed-url")]
    pub seed_urls: Vec<String>,

    /// Keep an HTML copy of the conversation at this path
    #[clap(long)]
    pub out: Option<PathBuf>,

    /// Also write log output to stderr
    #[clap(long)]
    pub log_stderr: bool,
}
