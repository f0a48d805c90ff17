use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::render::split_lines;

/// Request body shared by the streaming and the non-streaming endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_profile: Profile,
    #[serde(default)]
    pub seed_urls: Vec<String>,
    pub llm_provider: String,
    #[serde(default)]
    pub llm_model: String,
}

impl ChatRequest {
    /// The trimmed user message, if there is one.
    pub fn message(&self) -> Option<&str> {
        self.user_profile.message()
    }
}

/// User profile forwarded verbatim to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Value);

impl Profile {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn message(&self) -> Option<&str> {
        self.0
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Provider → model used when the user leaves the model blank.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "openai_compatible" => "gpt-4o-mini",
        "stub" => "stub",
        _ => "grok-3-mini-fast",
    }
}

/// The fields a user fills in beside the chat box. Multi-line fields hold
/// one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub user_id: String,
    pub locale: String,
    pub start_date: String,
    pub end_date: String,
    pub max_total: u64,
    pub currency: String,
    pub style: String,
    pub pace: String,
    pub constraints: String,
    pub dietary: String,
    pub limitations: String,
    pub risk_tolerance: String,
    pub time_horizon_years: u32,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            user_id: "u1".to_string(),
            locale: "en-US".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            max_total: 1200,
            currency: "USD".to_string(),
            style: "culture, adventure".to_string(),
            pace: "relaxed".to_string(),
            constraints: String::new(),
            dietary: String::new(),
            limitations: String::new(),
            risk_tolerance: "medium".to_string(),
            time_horizon_years: 5,
        }
    }
}

impl ProfileForm {
    pub fn build(&self, message: &str) -> Profile {
        Profile::new(json!({
            "user_id": self.user_id,
            "locale": self.locale,
            "message": message,
            "dates": {"start": self.start_date, "end": self.end_date},
            "budget": {"currency": self.currency, "max_total": self.max_total},
            "preferences": {"style": self.style, "pace": self.pace},
            "constraints": split_lines(&self.constraints),
            "health_notes": {
                "dietary": split_lines(&self.dietary),
                "limitations": split_lines(&self.limitations),
            },
            "finance_notes": {
                "risk_tolerance": self.risk_tolerance,
                "time_horizon_years": self.time_horizon_years,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_message_is_absent() {
        let form = ProfileForm::default();
        assert_eq!(form.build("   ").message(), None);
        assert_eq!(form.build(" hi ").message(), Some("hi"));
        assert_eq!(Profile::new(json!({"message": null})).message(), None);
    }

    #[test]
    fn form_splits_multiline_fields() {
        let form = ProfileForm {
            constraints: "Vegetarian\n\n No red-eye \n".to_string(),
            ..ProfileForm::default()
        };
        let profile = form.build("Plan a trip");
        assert_eq!(
            profile.as_value()["constraints"],
            json!(["Vegetarian", "No red-eye"])
        );
        assert_eq!(profile.as_value()["budget"]["max_total"], json!(1200));
    }

    #[test]
    fn request_serializes_profile_verbatim() {
        let request = ChatRequest {
            user_profile: Profile::new(json!({"message": "x", "custom": [1, 2]})),
            seed_urls: vec![],
            llm_provider: "stub".to_string(),
            llm_model: default_model("stub").to_string(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["user_profile"], json!({"message": "x", "custom": [1, 2]}));
        assert_eq!(body["llm_model"], json!("stub"));
    }
}
