//! Typed, partial views over the orchestrator's result payload.
//!
//! Nothing in here can fail: a field that is missing, null or of the wrong
//! shape simply takes its placeholder. The views borrow nothing from the
//! source value, and the source value is never modified.
pub(crate) mod lenient;
mod plans;

use serde_json::Value;

pub use plans::{
    Affordability, BudgetSummary, CostItem, Doctor, FinancialPlan, Guidance, HealthPlan, Hotel,
    ItineraryDay, SearchLink, Tone, TransportOption, TravelPlan,
};

/// The three agents the orchestrator can run, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Travel,
    Financial,
    Health,
}

impl AgentKind {
    /// Fixed section order of the result view.
    pub const ALL: [AgentKind; 3] = [AgentKind::Travel, AgentKind::Financial, AgentKind::Health];

    /// Key of this agent in the result payload and in `active_agents`.
    pub fn tag(self) -> &'static str {
        match self {
            AgentKind::Travel => "travel",
            AgentKind::Financial => "financial",
            AgentKind::Health => "health",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        AgentKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// Pipeline timing summary from `_meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMeta {
    pub total_ms: String,
    pub llm_model: String,
    pub pages_fetched: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub tokens: String,
    pub latency_ms: String,
}

/// A risk reported by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Risk {
    /// Free-text risk without a rating.
    Note(String),
    Rated {
        severity: String,
        risk: String,
        mitigation: String,
    },
}

impl Risk {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Some(Risk::Rated {
                severity: lenient::text(value, "severity").unwrap_or_else(|| "low".to_string()),
                risk: lenient::text(value, "risk").unwrap_or_default(),
                mitigation: lenient::text(value, "mitigation").unwrap_or_default(),
            }),
            other => lenient::display_text(other).map(Risk::Note),
        }
    }
}

/// Output of a single agent. `plan` stays untyped until a renderer asks for
/// its domain view.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub plan: Value,
    pub confidence: Option<f64>,
    pub stub: bool,
    pub usage: Option<Usage>,
    pub risks: Vec<Risk>,
    /// Set when the orchestrator reports that the agent itself failed.
    pub error: Option<String>,
    raw: Value,
}

impl AgentOutput {
    pub fn from_value(value: &Value) -> Self {
        let usage = value
            .get("_usage")
            .filter(|usage| lenient::flag(usage, "tokens"))
            .map(|usage| Usage {
                tokens: lenient::text(usage, "tokens").unwrap_or_default(),
                latency_ms: lenient::text(usage, "latency_ms").unwrap_or_else(|| "0".to_string()),
            });

        Self {
            plan: value.get("plan").cloned().unwrap_or(Value::Null),
            confidence: lenient::number(value, "confidence"),
            stub: lenient::flag(value, "_stub"),
            usage,
            risks: lenient::list(value, "risks")
                .iter()
                .filter_map(Risk::from_value)
                .collect(),
            error: lenient::text(value, "error"),
            raw: value.clone(),
        }
    }

    /// The agent output exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Confidence as a whole percentage.
    pub fn confidence_percent(&self) -> Option<i64> {
        self.confidence.map(|c| (c * 100.0).round() as i64)
    }

    pub fn travel_plan(&self) -> TravelPlan {
        TravelPlan::from_value(&self.plan)
    }

    pub fn health_plan(&self) -> HealthPlan {
        HealthPlan::from_value(&self.plan)
    }

    pub fn financial_plan(&self) -> FinancialPlan {
        FinancialPlan::from_value(&self.plan)
    }
}

/// The whole orchestrator response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPayload {
    pub meta: Option<PipelineMeta>,
    pub active_agents: Vec<String>,
    /// Item URLs per evidence bucket, buckets and items in source order.
    pub evidence: Vec<Vec<String>>,
    /// Present agent outputs, always in [`AgentKind::ALL`] order.
    pub agents: Vec<(AgentKind, AgentOutput)>,
    pub conflicts: Vec<String>,
}

impl ResultPayload {
    pub fn from_value(value: &Value) -> Self {
        let meta = value.get("_meta").and_then(|meta| {
            meta.get("timings")
                .filter(|timings| timings.is_object())
                .map(|timings| PipelineMeta {
                    total_ms: lenient::text(timings, "total_ms").unwrap_or_else(|| "0".to_string()),
                    llm_model: lenient::text(meta, "llm_model").unwrap_or_default(),
                    pages_fetched: lenient::text(meta, "pages_fetched")
                        .unwrap_or_else(|| "0".to_string()),
                })
        });

        let evidence = value
            .get("evidence")
            .and_then(Value::as_object)
            .map(|buckets| {
                buckets
                    .values()
                    .map(|items| {
                        items
                            .as_array()
                            .map(Vec::as_slice)
                            .unwrap_or(&[])
                            .iter()
                            .filter_map(|item| lenient::text(item, "url"))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let agents = AgentKind::ALL
            .into_iter()
            .filter(|kind| lenient::flag(value, kind.tag()))
            .filter_map(|kind| {
                value
                    .get(kind.tag())
                    .map(|output| (kind, AgentOutput::from_value(output)))
            })
            .collect();

        Self {
            meta,
            active_agents: lenient::list(value, "active_agents")
                .iter()
                .filter_map(lenient::scalar_text)
                .collect(),
            evidence,
            agents,
            conflicts: lenient::text_list(value, "conflicts"),
        }
    }

    /// Evidence URLs across all buckets, first occurrence wins.
    pub fn evidence_urls(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for url in self.evidence.iter().flatten() {
            if !seen.contains(&url.as_str()) {
                seen.push(url.as_str());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agents_follow_fixed_order_not_active_list() {
        let payload = ResultPayload::from_value(&json!({
            "active_agents": ["health", "travel"],
            "health": {"plan": {}},
            "financial": {"plan": {}},
        }));
        let kinds: Vec<_> = payload.agents.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![AgentKind::Financial, AgentKind::Health]);
        assert_eq!(payload.active_agents, vec!["health", "travel"]);
    }

    #[test]
    fn evidence_urls_are_deduplicated_in_first_seen_order() {
        let payload = ResultPayload::from_value(&json!({
            "evidence": {
                "travel": [{"url": "https://b.example"}, {"title": "no url"}, "junk"],
                "health": [{"url": "https://a.example"}, {"url": "https://b.example"}],
                "finance": null
            }
        }));
        assert_eq!(
            payload.evidence_urls(),
            vec!["https://b.example", "https://a.example"]
        );
    }

    #[test]
    fn zero_confidence_is_kept() {
        let output = AgentOutput::from_value(&json!({"plan": {}, "confidence": 0}));
        assert_eq!(output.confidence_percent(), Some(0));
        let output = AgentOutput::from_value(&json!({"plan": {}, "confidence": 0.855}));
        assert_eq!(output.confidence_percent(), Some(86));
    }

    #[test]
    fn rated_risk_defaults_to_low_severity() {
        let output = AgentOutput::from_value(&json!({"risks": [{"risk": "r"}, "plain", null]}));
        assert_eq!(
            output.risks,
            vec![
                Risk::Rated {
                    severity: "low".to_string(),
                    risk: "r".to_string(),
                    mitigation: String::new(),
                },
                Risk::Note("plain".to_string()),
            ]
        );
    }

    #[test]
    fn non_object_payload_is_empty() {
        assert_eq!(ResultPayload::from_value(&json!("text")), ResultPayload::default());
    }
}
