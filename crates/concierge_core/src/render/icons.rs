use crate::model::AgentKind;

/// Keyword → icon table for transport modes. Order matters: the first
/// keyword found in the mode wins.
const MODE_ICONS: &[(&str, &str)] = &[
    ("flight", "✈️"),
    ("fly", "✈️"),
    ("air", "✈️"),
    ("train", "🚆"),
    ("rail", "🚆"),
    ("bus", "🚌"),
    ("coach", "🚌"),
    ("car", "🚗"),
    ("drive", "🚗"),
    ("taxi", "🚕"),
    ("ship", "🚢"),
    ("ferry", "⛴️"),
    ("cruise", "🚢"),
    ("bike", "🏍️"),
    ("walk", "🚶"),
];

const FALLBACK_MODE_ICON: &str = "🚀";
const FALLBACK_AGENT_ICON: &str = "🤖";

pub fn mode_icon(mode: &str) -> &'static str {
    let mode = mode.to_lowercase();
    MODE_ICONS
        .iter()
        .find(|(keyword, _)| mode.contains(keyword))
        .map(|(_, icon)| *icon)
        .unwrap_or(FALLBACK_MODE_ICON)
}

pub fn agent_icon(tag: &str) -> &'static str {
    match AgentKind::from_tag(tag) {
        Some(kind) => kind_icon(kind),
        None => FALLBACK_AGENT_ICON,
    }
}

pub(crate) fn kind_icon(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Travel => "✈️",
        AgentKind::Financial => "💰",
        AgentKind::Health => "🩺",
    }
}

pub(crate) fn kind_title(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Travel => "Travel Planner",
        AgentKind::Financial => "Financial Advisor",
        AgentKind::Health => "Health & Doctors",
    }
}

pub(crate) fn severity_dot(severity: &str) -> &'static str {
    match severity {
        "high" => "🔴",
        "medium" => "🟡",
        "low" => "🟢",
        _ => "⚪",
    }
}
