use askama::Template;
use concierge_core::{Role, TranscriptEntry};

use super::constants::PAGE_TITLE;

struct PageEntry<'a> {
    class: &'static str,
    html: &'a str,
}

#[derive(Template)]
#[template(path = "transcript.html")]
struct TranscriptPage<'a> {
    title: &'static str,
    generated_utc: &'a str,
    entries: Vec<PageEntry<'a>>,
}

/// Standalone HTML page holding the whole transcript.
pub fn transcript_page(entries: &[TranscriptEntry], generated_utc: &str) -> askama::Result<String> {
    let entries = entries
        .iter()
        .map(|entry| PageEntry {
            class: match entry.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            html: &entry.html,
        })
        .collect();

    TranscriptPage {
        title: PAGE_TITLE,
        generated_utc,
        entries,
    }
    .render()
}
