use askama::Template;

use crate::model::{Doctor, HealthPlan};

use super::escape::{multiline, safe_href, split_lines};
use super::{bullet_list, collapsible, link_button, section, Link};

#[derive(Template)]
#[template(path = "health/query_summary.html")]
struct QuerySummary<'a> {
    summary: &'a str,
}

struct DoctorCard<'a> {
    doctor: &'a Doctor,
    why: String,
    link: String,
}

#[derive(Template)]
#[template(path = "health/doctor_cards.html")]
struct DoctorCards<'a> {
    cards: Vec<DoctorCard<'a>>,
}

#[derive(Template)]
#[template(path = "health/overview.html")]
struct Overview<'a> {
    lines: Vec<&'a str>,
}

#[derive(Template)]
#[template(path = "health/red_flags.html")]
struct RedFlags<'a> {
    flags: &'a [String],
}

#[derive(Template)]
#[template(path = "health/search_links.html")]
struct SearchLinks<'a> {
    links: Vec<Link<'a>>,
}

#[derive(Template)]
#[template(path = "health/disclaimer.html")]
struct Disclaimer<'a> {
    disclaimer: &'a str,
}

pub(crate) fn render(plan: &HealthPlan) -> String {
    let mut out = String::new();

    if let Some(summary) = &plan.query_summary {
        out.push_str(&QuerySummary { summary }.to_string());
    }

    if !plan.doctors.is_empty() {
        let cards = plan
            .doctors
            .iter()
            .map(|doctor| DoctorCard {
                doctor,
                why: multiline(&doctor.why_recommended),
                link: link_button(&doctor.link, "pink", "🔍 Find & Book →"),
            })
            .collect();
        out.push_str(&section(
            "health-doctors",
            &format!("👨‍⚕️ Top {} Recommended Specialists", plan.doctors.len()),
            &DoctorCards { cards }.to_string(),
        ));
    }

    let guidance = &plan.guidance;
    if let Some(overview) = &guidance.overview {
        out.push_str(&collapsible(
            "guidance",
            "📋 Overview",
            &Overview {
                lines: split_lines(overview),
            }
            .to_string(),
            true,
        ));
    }
    let lists = [
        ("⚠️ Key Symptoms to Watch", &guidance.key_symptoms, true),
        ("🏃 Lifestyle Recommendations", &guidance.lifestyle_recommendations, true),
        ("🥗 Dietary Advice", &guidance.dietary_advice, false),
    ];
    for (title, items, open) in lists {
        if !items.is_empty() {
            out.push_str(&collapsible("guidance", title, &bullet_list(items), open));
        }
    }
    if !guidance.red_flags.is_empty() {
        out.push_str(&collapsible(
            "guidance guidance-emergency",
            "🚨 Red Flags — Seek Emergency Care",
            &RedFlags {
                flags: &guidance.red_flags,
            }
            .to_string(),
            true,
        ));
    }
    if !guidance.preventive_measures.is_empty() {
        out.push_str(&collapsible(
            "guidance",
            "🛡️ Preventive Measures",
            &bullet_list(&guidance.preventive_measures),
            false,
        ));
    }

    if !plan.search_links.is_empty() {
        let links = plan
            .search_links
            .iter()
            .map(|link| Link {
                href: safe_href(&link.url),
                text: &link.label,
            })
            .collect();
        out.push_str(&section(
            "health-links",
            "🔗 Helpful Search Links",
            &SearchLinks { links }.to_string(),
        ));
    }

    out.push_str(
        &Disclaimer {
            disclaimer: &plan.disclaimer,
        }
        .to_string(),
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_disclaimer_is_always_shown() {
        let html = render(&HealthPlan::from_value(&json!({})));
        assert!(html.contains("informational purposes only"));
        assert!(!html.contains("doctor-card"));
    }

    #[test]
    fn empty_guidance_lists_are_omitted() {
        let html = render(&HealthPlan::from_value(&json!({
            "health_guidance": {
                "overview": "Migraines are common.\n\n<Rest> helps.",
                "key_symptoms": [],
                "red_flags_seek_emergency": ["Sudden severe headache"]
            }
        })));
        assert!(html.contains("📋 Overview"));
        assert!(html.contains("<p>Migraines are common.<br>&lt;Rest&gt; helps.</p>"));
        assert!(!html.contains("Key Symptoms"));
        assert!(html.contains(r#"<div class="red-flag">🚨 Sudden severe headache</div>"#));
    }

    #[test]
    fn doctors_are_ranked_in_input_order() {
        let html = render(&HealthPlan::from_value(&json!({
            "top_doctors": [{"name": "Dr. B", "rank": 2}, {"name": "Dr. A", "rank": 1}]
        })));
        assert!(html.contains(r#"<span class="rank-badge">#1</span><h4>Dr. B</h4>"#));
        assert!(html.contains(r#"<span class="rank-badge">#2</span><h4>Dr. A</h4>"#));
    }

    #[test]
    fn search_links_fall_back_to_hash() {
        let html = render(&HealthPlan::from_value(&json!({
            "helpful_search_links": [{"url": "javascript:alert(1)"}]
        })));
        assert!(html.contains(r##"<a href="#" target="_blank" rel="noopener" class="search-link">🔍 Search</a>"##));
    }
}
