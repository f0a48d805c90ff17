use askama::Template;

use crate::model::{Affordability, BudgetSummary, FinancialPlan, Tone};

use super::{bullet_list, collapsible};

#[derive(Template)]
#[template(path = "financial/budget_rows.html")]
struct BudgetRows<'a> {
    rows: &'a [(String, String)],
}

#[derive(Template)]
#[template(path = "financial/affordability.html")]
struct AffordabilityNote<'a> {
    check: &'a Affordability,
    tone: &'static str,
    reasoning: String,
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "positive",
        Tone::Warning => "warning",
        Tone::Danger => "danger",
    }
}

pub(crate) fn render(plan: &FinancialPlan) -> String {
    let mut out = String::new();

    let summary = match &plan.budget_summary {
        BudgetSummary::Rows(rows) => Some(BudgetRows { rows }.to_string()),
        BudgetSummary::Items(items) => Some(bullet_list(items)),
        BudgetSummary::Empty => None,
    };
    if let Some(body) = summary {
        out.push_str(&collapsible("budget-summary", "📊 Budget Summary", &body, true));
    }

    if let Some(check) = &plan.affordability {
        let reasoning = if check.reasoning.is_empty() {
            String::new()
        } else {
            bullet_list(&check.reasoning)
        };
        out.push_str(
            &AffordabilityNote {
                check,
                tone: tone_class(check.tone),
                reasoning,
            }
            .to_string(),
        );
    }

    if !plan.cost_controls.is_empty() {
        out.push_str(&collapsible(
            "cost-controls",
            "💡 Cost-Saving Tips",
            &bullet_list(&plan.cost_controls),
            true,
        ));
    }

    if !plan.priorities.is_empty() {
        out.push_str(&collapsible(
            "priorities",
            "🎯 Financial Priorities Framework",
            &bullet_list(&plan.priorities),
            false,
        ));
    }

    out
}
