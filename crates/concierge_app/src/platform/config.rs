use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use concierge_core::{default_model, ChatRequest, ProfileForm};
use concierge_engine::{ClientSettings, DEFAULT_BASE_URL};
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cli::Args;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// User settings kept in `concierge.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub llm_provider: String,
    /// Empty means the provider's default model.
    pub llm_model: String,
    pub seed_urls: Vec<String>,
    pub profile: ProfileForm,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_BASE_URL.to_string(),
            llm_provider: "grok".to_string(),
            llm_model: String::new(),
            seed_urls: Vec::new(),
            profile: ProfileForm::default(),
        }
    }
}

impl ClientConfig {
    /// Command line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(server) = &args.server {
            self.server_url = server.clone();
        }
        if let Some(provider) = &args.provider {
            self.llm_provider = provider.clone();
        }
        if let Some(model) = &args.model {
            self.llm_model = model.clone();
        }
        if !args.seed_urls.is_empty() {
            self.seed_urls = args.seed_urls.clone();
        }
    }

    pub fn model(&self) -> String {
        let model = self.llm_model.trim();
        if model.is_empty() {
            default_model(&self.llm_provider).to_string()
        } else {
            model.to_string()
        }
    }

    pub fn settings(&self) -> ClientSettings {
        ClientSettings::for_base_url(&self.server_url)
    }

    pub fn request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            user_profile: self.profile.build(message),
            seed_urls: self.seed_urls.clone(),
            llm_provider: self.llm_provider.clone(),
            llm_model: self.model(),
        }
    }
}

/// Reads the config file. A missing file is not an error.
pub fn read_config(path: &Path) -> Result<Option<ClientConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the config, falling back to defaults when the file is absent or broken.
pub fn load_config(path: &Path) -> ClientConfig {
    match read_config(path) {
        Ok(Some(config)) => {
            engine_info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => ClientConfig::default(),
        Err(err) => {
            engine_warn!("{}; using defaults", err);
            ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_config(&temp.path().join("concierge.ron")).unwrap().is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("concierge.ron");
        fs::write(
            &path,
            r#"(llm_provider: "stub", profile: (user_id: "u7", max_total: 3000))"#,
        )
        .unwrap();

        let config = read_config(&path).unwrap().unwrap();
        assert_eq!(config.llm_provider, "stub");
        assert_eq!(config.server_url, DEFAULT_BASE_URL);
        assert_eq!(config.profile.user_id, "u7");
        assert_eq!(config.profile.max_total, 3000);
        assert_eq!(config.profile.currency, "USD");
        assert_eq!(config.model(), "stub");
    }

    #[test]
    fn broken_file_is_a_parse_error_and_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("concierge.ron");
        fs::write(&path, "(llm_provider: ").unwrap();

        assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(load_config(&path), ClientConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let args = Args::parse_from([
            "concierge",
            "--server",
            "http://backend:9000",
            "--provider",
            "openai_compatible",
            "--seed-url",
            "https://wikivoyage.org/wiki/Goa",
        ]);
        let mut config = ClientConfig {
            llm_model: "  ".to_string(),
            ..ClientConfig::default()
        };
        config.apply_args(&args);

        assert_eq!(config.settings().stream_endpoint, "http://backend:9000/api/chat/stream");
        assert_eq!(config.model(), "gpt-4o-mini");
        let request = config.request("Plan a trip");
        assert_eq!(request.seed_urls, vec!["https://wikivoyage.org/wiki/Goa"]);
        assert_eq!(request.message(), Some("Plan a trip"));
    }
}
