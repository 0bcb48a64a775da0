//! Configuration loaded from the process environment.

use serde::{Deserialize, Serialize};

/// Top-level Windward configuration.
///
/// Every field comes from an environment variable; call
/// [`Config::from_env`] after loading any `.env` file. Accessor methods
/// provide the defaults so callers never reach into the `Option`s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// `OPENAI_API_KEY` — required to talk to the assistant provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// `ASSISTANT_ID` — optional; when unset a new assistant is created
    /// on first use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,

    /// `OPENAI_MODEL` — model identifier for the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,

    /// `OPENWEATHER_API_KEY` — key for the weather lookup tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openweather_api_key: Option<String>,

    /// `WINDWARD_BIND` — listen address for the HTTP server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// `WINDWARD_PORT` — listen port for the HTTP server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_var("OPENAI_API_KEY"),
            assistant_id: env_var("ASSISTANT_ID"),
            openai_model: env_var("OPENAI_MODEL"),
            openweather_api_key: env_var("OPENWEATHER_API_KEY"),
            bind: env_var("WINDWARD_BIND"),
            port: env_var("WINDWARD_PORT").and_then(|p| p.parse().ok()),
        }
    }

    pub fn model(&self) -> String {
        self.openai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o".to_string())
    }

    pub fn bind_addr(&self) -> String {
        self.bind.clone().unwrap_or_else(|| "0.0.0.0".to_string())
    }

    pub fn listen_port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }

    /// Copy of the config with secrets masked, for `config show`.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***".to_string());
        Self {
            openai_api_key: mask(&self.openai_api_key),
            openweather_api_key: mask(&self.openweather_api_key),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.bind_addr(), "0.0.0.0");
        assert_eq!(config.listen_port(), 8000);
    }

    #[test]
    fn test_overrides_win() {
        let config = Config {
            openai_model: Some("gpt-4o-mini".into()),
            bind: Some("127.0.0.1".into()),
            port: Some(9000),
            ..Default::default()
        };
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.bind_addr(), "127.0.0.1");
        assert_eq!(config.listen_port(), 9000);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = Config {
            openai_api_key: Some("sk-secret".into()),
            openweather_api_key: Some("ow-secret".into()),
            assistant_id: Some("asst_1".into()),
            ..Default::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.openai_api_key.as_deref(), Some("***"));
        assert_eq!(shown.openweather_api_key.as_deref(), Some("***"));
        // Non-secret fields stay readable.
        assert_eq!(shown.assistant_id.as_deref(), Some("asst_1"));
    }

    #[test]
    fn test_redacted_keeps_unset_fields_unset() {
        let shown = Config::default().redacted();
        assert!(shown.openai_api_key.is_none());
        assert!(shown.openweather_api_key.is_none());
    }
}
