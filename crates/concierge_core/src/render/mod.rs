//! Pure HTML rendering of orchestrator results.
//!
//! Every fragment is an askama template under `templates/`, so payload text
//! is escaped on output and links are checked before they reach an `href`. Rendering
//! goes through `Display`; nothing here can fail.
mod agent;
mod escape;
mod financial;
mod health;
mod icons;
mod travel;

use askama::Template;
use serde_json::Value;

use crate::model::{PipelineMeta, ResultPayload};

pub use agent::render_agent;
pub(crate) use escape::split_lines;
use escape::{multiline, safe_href, truncate_chars};
use icons::agent_icon;

/// Fragment shown when a completed request produced nothing to display.
pub const NO_OUTPUT: &str = r#"<div class="no-output">No output returned.</div>"#;

/// Upper bound on error text shown to the user, in characters.
pub const MAX_ERROR_CHARS: usize = 400;

#[derive(Template)]
#[template(path = "meta_line.html")]
struct MetaLine<'a> {
    meta: &'a PipelineMeta,
}

struct AgentBadge {
    icon: &'static str,
    title: String,
}

#[derive(Template)]
#[template(path = "agent_badges.html")]
struct AgentBadges {
    badges: Vec<AgentBadge>,
}

struct Link<'a> {
    href: String,
    text: &'a str,
}

#[derive(Template)]
#[template(path = "link_list.html")]
struct LinkList<'a> {
    links: Vec<Link<'a>>,
}

#[derive(Template)]
#[template(path = "collapsible.html")]
struct Collapsible<'a> {
    class: &'a str,
    summary: &'a str,
    body: &'a str,
    open: bool,
}

#[derive(Template)]
#[template(path = "section.html")]
struct Section<'a> {
    class: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Template)]
#[template(path = "bullet_list.html")]
struct BulletList<'a> {
    items: Vec<&'a str>,
}

#[derive(Template)]
#[template(path = "link_button.html")]
struct LinkButton<'a> {
    href: String,
    class: &'a str,
    label: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorMessage<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "user_message.html")]
struct UserMessage {
    text: String,
}

/// Renders a raw payload, or the no-output fragment when there is none.
pub fn render_payload(payload: Option<&Value>) -> String {
    match payload {
        Some(value) => render_result(&ResultPayload::from_value(value)),
        None => NO_OUTPUT.to_string(),
    }
}

/// Renders a full result: meta line, agent badges, evidence, one section per
/// agent output and the conflicts list, in that order.
pub fn render_result(result: &ResultPayload) -> String {
    let mut out = String::new();

    if let Some(meta) = &result.meta {
        out.push_str(&MetaLine { meta }.to_string());
    }

    if !result.active_agents.is_empty() {
        let badges = result
            .active_agents
            .iter()
            .map(|tag| AgentBadge {
                icon: agent_icon(tag),
                title: title_case(tag),
            })
            .collect();
        out.push_str(&AgentBadges { badges }.to_string());
    }

    let urls = result.evidence_urls();
    if !urls.is_empty() {
        let links = urls
            .iter()
            .map(|url| Link {
                href: safe_href(url),
                text: url,
            })
            .collect();
        out.push_str(&collapsible(
            "evidence",
            &format!("📚 Evidence Sources ({})", urls.len()),
            &LinkList { links }.to_string(),
            false,
        ));
    }

    for (kind, output) in &result.agents {
        out.push_str(&render_agent(*kind, output));
    }

    if !result.conflicts.is_empty() {
        out.push_str(&collapsible(
            "conflicts",
            &format!("⚠️ Cross-Agent Conflicts ({})", result.conflicts.len()),
            &bullet_list(&result.conflicts),
            true,
        ));
    }

    if out.is_empty() {
        return NO_OUTPUT.to_string();
    }
    out
}

/// Danger-styled fragment for a failed submission.
pub fn render_error(message: &str) -> String {
    ErrorMessage {
        message: truncate_chars(message, MAX_ERROR_CHARS),
    }
    .to_string()
}

/// The user's own message as shown in the transcript.
pub fn render_user_message(message: &str) -> String {
    UserMessage {
        text: multiline(message),
    }
    .to_string()
}

/// `<details>` block; `summary` is plain text, `body` is HTML.
pub(crate) fn collapsible(class: &str, summary: &str, body: &str, open: bool) -> String {
    Collapsible {
        class,
        summary,
        body,
        open,
    }
    .to_string()
}

/// Titled block; `title` is plain text, `body` is HTML.
pub(crate) fn section(class: &str, title: &str, body: &str) -> String {
    Section { class, title, body }.to_string()
}

pub(crate) fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    BulletList {
        items: items.iter().map(AsRef::as_ref).collect(),
    }
    .to_string()
}

/// Booking-style button; `label` is plain text.
pub(crate) fn link_button(href: &str, class: &str, label: &str) -> String {
    LinkButton {
        href: safe_href(href),
        class,
        label,
    }
    .to_string()
}

fn title_case(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_is_truncated_and_escaped() {
        let long = "<".repeat(500);
        let html = render_error(&long);
        assert_eq!(html.matches("&lt;").count(), MAX_ERROR_CHARS);
    }

    #[test]
    fn collapsible_escapes_summary_but_not_body() {
        let html = collapsible("risks-section", "⚠️ Risks & Warnings", "<ul></ul>", true);
        assert_eq!(
            html,
            r#"<details class="risks-section" open><summary>⚠️ Risks &amp; Warnings</summary><ul></ul></details>"#
        );
    }

    #[test]
    fn link_button_never_emits_script_urls() {
        let html = link_button("javascript:alert(1)", "blue", "🔍 Search & Book →");
        assert_eq!(
            html,
            r##"<a href="#" target="_blank" rel="noopener" class="book-link blue">🔍 Search &amp; Book →</a>"##
        );
    }

    #[test]
    fn user_message_keeps_line_breaks() {
        assert_eq!(
            render_user_message("Plan a trip\n<to Goa>"),
            r#"<div class="user-msg">Plan a trip<br>&lt;to Goa&gt;</div>"#
        );
    }

    #[test]
    fn title_case_handles_empty() {
        assert_eq!(title_case("travel"), "Travel");
        assert_eq!(title_case(""), "");
    }
}
