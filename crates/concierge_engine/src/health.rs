use crate::stream::map_reqwest_error;
use crate::{ClientError, ClientSettings, FailureKind, HealthStatus};

/// Asks the backend whether it is up and has a model key configured.
pub async fn check_health(settings: &ClientSettings) -> Result<HealthStatus, ClientError> {
    let url = reqwest::Url::parse(&settings.health_endpoint)
        .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
    let client = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.health_timeout)
        .build()
        .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

    let response = client.get(url).send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
}

impl HealthStatus {
    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        let mut parts = vec![if self.ok { "backend ok" } else { "backend unhealthy" }.to_string()];
        if let Some(version) = &self.version {
            parts.push(format!("v{version}"));
        }
        if let Some(provider) = &self.default_provider {
            parts.push(format!("provider {provider}"));
        }
        parts.push(if self.api_key_set { "api key set" } else { "no api key (stub mode)" }.to_string());
        parts.join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_known_fields() {
        let status = HealthStatus {
            ok: true,
            api_key_set: false,
            version: Some("0.4.0".to_string()),
            default_provider: Some("grok".to_string()),
        };
        assert_eq!(
            status.summary(),
            "backend ok · v0.4.0 · provider grok · no api key (stub mode)"
        );
    }
}
