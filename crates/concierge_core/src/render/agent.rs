use askama::Template;

use crate::model::{AgentKind, AgentOutput, Risk};

use super::escape::css_token;
use super::icons::{kind_icon, kind_title, severity_dot};
use super::{collapsible, financial, health, travel};

#[derive(Template)]
#[template(path = "agent_section.html")]
struct AgentSection<'a> {
    tag: &'static str,
    icon: &'static str,
    title: &'static str,
    output: &'a AgentOutput,
    confidence: Option<i64>,
    body: String,
    risks: String,
    raw_json: String,
}

struct Rating<'a> {
    class: String,
    dot: &'static str,
    severity: String,
    mitigation: &'a str,
}

struct RiskRow<'a> {
    text: &'a str,
    rating: Option<Rating<'a>>,
}

#[derive(Template)]
#[template(path = "risks.html")]
struct RiskList<'a> {
    rows: Vec<RiskRow<'a>>,
}

#[derive(Template)]
#[template(path = "preformatted.html")]
struct Preformatted<'a> {
    text: &'a str,
}

/// Renders one agent's section: header, usage, domain body, risks and the
/// raw JSON of the output.
pub fn render_agent(kind: AgentKind, output: &AgentOutput) -> String {
    let body = match kind {
        AgentKind::Travel => travel::render(&output.travel_plan()),
        AgentKind::Financial => financial::render(&output.financial_plan()),
        AgentKind::Health => health::render(&output.health_plan()),
    };
    AgentSection {
        tag: kind.tag(),
        icon: kind_icon(kind),
        title: kind_title(kind),
        output,
        confidence: output.confidence_percent(),
        body,
        risks: render_risks(&output.risks),
        raw_json: raw_json(output),
    }
    .to_string()
}

fn risk_row(risk: &Risk) -> RiskRow<'_> {
    match risk {
        Risk::Note(text) => RiskRow { text, rating: None },
        Risk::Rated {
            severity,
            risk,
            mitigation,
        } => RiskRow {
            text: risk,
            rating: Some(Rating {
                class: match css_token(severity) {
                    token if token.is_empty() => "low".to_string(),
                    token => token,
                },
                dot: severity_dot(severity),
                severity: severity.to_uppercase(),
                mitigation,
            }),
        },
    }
}

fn render_risks(risks: &[Risk]) -> String {
    if risks.is_empty() {
        return String::new();
    }
    let items = RiskList {
        rows: risks.iter().map(risk_row).collect(),
    }
    .to_string();
    collapsible("risks-section", "⚠️ Risks & Warnings", &items, false)
}

fn raw_json(output: &AgentOutput) -> String {
    let pretty = serde_json::to_string_pretty(output.raw())
        .unwrap_or_else(|_| output.raw().to_string());
    collapsible(
        "raw-json",
        "📄 Raw JSON",
        &Preformatted { text: &pretty }.to_string(),
        false,
    )
}
