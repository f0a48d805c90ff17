use serde_json::Value;

use super::lenient::{display_text, flag, list, scalar_text, text, text_list};

pub(crate) const DEFAULT_DISCLAIMER: &str = "This is for informational purposes only. Please consult a qualified healthcare professional for diagnosis and treatment.";

fn or(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

// ---- travel ----

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TravelPlan {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub best_time_to_visit: Option<String>,
    pub transport: Vec<TransportOption>,
    pub hotels: Vec<Hotel>,
    pub itinerary: Vec<ItineraryDay>,
    pub costs: Vec<CostItem>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOption {
    pub mode: String,
    pub duration: String,
    pub estimated_cost: String,
    pub details: String,
    pub booking_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotel {
    pub name: String,
    pub kind: String,
    pub area: String,
    pub price_per_night: String,
    pub why: String,
    pub booking_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryDay {
    pub day: String,
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostItem {
    pub category: String,
    pub estimate: String,
    pub assumptions: Option<String>,
}

impl TravelPlan {
    pub fn from_value(plan: &Value) -> Self {
        Self {
            origin: text(plan, "origin"),
            destination: text(plan, "destination"),
            best_time_to_visit: text(plan, "best_time_to_visit"),
            transport: list(plan, "transport_options")
                .iter()
                .map(|opt| TransportOption {
                    mode: or(text(opt, "mode"), "Transport"),
                    duration: or(text(opt, "duration"), "N/A"),
                    estimated_cost: or(text(opt, "estimated_cost"), "Check link"),
                    details: or(text(opt, "details"), ""),
                    booking_link: or(text(opt, "booking_link"), "#"),
                })
                .collect(),
            hotels: list(plan, "hotels")
                .iter()
                .map(|hotel| Hotel {
                    name: or(text(hotel, "name"), "Hotel"),
                    kind: or(text(hotel, "type"), "hotel"),
                    area: or(text(hotel, "area"), "Central"),
                    price_per_night: or(text(hotel, "price_per_night"), "Check link"),
                    why: or(text(hotel, "why"), ""),
                    booking_link: or(text(hotel, "booking_link"), "#"),
                })
                .collect(),
            itinerary: list(plan, "itinerary_by_day")
                .iter()
                .map(|day| ItineraryDay {
                    day: or(text(day, "day"), "?"),
                    morning: text(day, "morning"),
                    afternoon: text(day, "afternoon"),
                    evening: text(day, "evening"),
                    notes: text(day, "notes"),
                })
                .collect(),
            costs: list(plan, "estimated_cost_breakdown")
                .iter()
                .map(|cost| CostItem {
                    category: or(text(cost, "category"), ""),
                    estimate: or(text(cost, "estimate"), "—"),
                    assumptions: text(cost, "assumptions"),
                })
                .collect(),
            tips: text_list(plan, "travel_tips"),
        }
    }

    pub fn has_route(&self) -> bool {
        self.origin.is_some() || self.destination.is_some()
    }
}

// ---- health ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthPlan {
    pub query_summary: Option<String>,
    pub doctors: Vec<Doctor>,
    pub guidance: Guidance,
    pub search_links: Vec<SearchLink>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
    pub hospital: String,
    pub location: String,
    pub why_recommended: String,
    /// `search_link`, else `booking_link`, else `#`.
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Guidance {
    pub overview: Option<String>,
    pub key_symptoms: Vec<String>,
    pub lifestyle_recommendations: Vec<String>,
    pub dietary_advice: Vec<String>,
    pub red_flags: Vec<String>,
    pub preventive_measures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLink {
    pub label: String,
    pub url: String,
}

impl HealthPlan {
    pub fn from_value(plan: &Value) -> Self {
        let guidance = plan
            .get("health_guidance")
            .map(|g| Guidance {
                overview: text(g, "overview"),
                key_symptoms: text_list(g, "key_symptoms"),
                lifestyle_recommendations: text_list(g, "lifestyle_recommendations"),
                dietary_advice: text_list(g, "dietary_advice"),
                red_flags: text_list(g, "red_flags_seek_emergency"),
                preventive_measures: text_list(g, "preventive_measures"),
            })
            .unwrap_or_default();

        Self {
            query_summary: text(plan, "query_summary"),
            doctors: list(plan, "top_doctors")
                .iter()
                .map(|doc| Doctor {
                    name: or(text(doc, "name"), "Doctor"),
                    specialty: or(text(doc, "specialty"), "Specialist"),
                    hospital: or(text(doc, "hospital"), "Hospital"),
                    location: or(text(doc, "location"), ""),
                    why_recommended: or(text(doc, "why_recommended"), ""),
                    link: or(
                        text(doc, "search_link").or_else(|| text(doc, "booking_link")),
                        "#",
                    ),
                })
                .collect(),
            guidance,
            search_links: list(plan, "helpful_search_links")
                .iter()
                .map(|link| SearchLink {
                    label: or(text(link, "label"), "Search"),
                    url: or(text(link, "url"), "#"),
                })
                .collect(),
            disclaimer: or(text(plan, "disclaimer"), DEFAULT_DISCLAIMER),
        }
    }
}

// ---- financial ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetSummary {
    /// Label/value rows from an object.
    Rows(Vec<(String, String)>),
    /// Bullet items from an array.
    Items(Vec<String>),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Warning,
    Danger,
}

impl Tone {
    pub fn for_status(status: &str) -> Self {
        match status {
            "likely_ok" => Tone::Positive,
            "uncertain" => Tone::Warning,
            _ => Tone::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordability {
    pub status: String,
    pub tone: Tone,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialPlan {
    pub budget_summary: BudgetSummary,
    pub affordability: Option<Affordability>,
    pub cost_controls: Vec<String>,
    pub priorities: Vec<String>,
}

impl FinancialPlan {
    pub fn from_value(plan: &Value) -> Self {
        let budget_summary = match plan.get("budget_summary") {
            Some(Value::Object(map)) if !map.is_empty() => BudgetSummary::Rows(
                map.iter()
                    .map(|(label, value)| (label.clone(), display_text(value).unwrap_or_default()))
                    .collect(),
            ),
            Some(Value::Array(items)) if !items.is_empty() => {
                BudgetSummary::Items(items.iter().filter_map(display_text).collect())
            }
            _ => BudgetSummary::Empty,
        };

        let affordability = plan
            .get("travel_affordability_check")
            .filter(|_| flag(plan, "travel_affordability_check"))
            .map(|check| {
                let status = text(check, "status").unwrap_or_else(|| "unknown".to_string());
                let reasoning = match check.get("reasoning") {
                    Some(Value::Array(_)) => text_list(check, "reasoning"),
                    Some(single) => scalar_text(single).into_iter().collect(),
                    None => Vec::new(),
                };
                Affordability {
                    tone: Tone::for_status(&status),
                    status,
                    reasoning,
                }
            });

        Self {
            budget_summary,
            affordability,
            cost_controls: text_list(plan, "cost_controls"),
            priorities: text_list(plan, "financial_priorities_framework"),
        }
    }
}
