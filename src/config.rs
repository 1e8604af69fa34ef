use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::prompt::DEFAULT_SYSTEM_PROMPT;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_MAX_ITERATIONS: usize = 15;


#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which backend answers the agent's requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Ollama,
}

/// Model and loop settings. Fixed once an agent is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub provider: Provider,
    pub model_name: String,
    /// Sampling temperature, 0.0 to 2.0.
    pub temperature: f32,
    /// Response length cap per model call.
    pub max_tokens: u32,
    /// Model calls allowed in one run before giving up.
    pub max_iterations: usize,
    pub system_prompt: String,
    /// Override for OpenAI-compatible endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_base: None,
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl AgentConfig {
    pub fn new(model_name: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model_name: model_name.into(),
            temperature,
            max_tokens,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::MissingConfig("model_name".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidConfig(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidConfig("max_tokens must be positive".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidConfig("max_iterations must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AgentConfig::default();
        assert_eq!(config.model_name, "gpt-3.5-turbo");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.max_iterations, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let empty = AgentConfig::new("", 0.7, 100);
        assert!(matches!(empty.validate(), Err(ConfigError::MissingConfig(_))));

        let zero_tokens = AgentConfig::new("gpt-4o", 0.7, 0);
        assert!(matches!(zero_tokens.validate(), Err(ConfigError::InvalidConfig(_))));

        let hot = AgentConfig::new("gpt-4o", 2.5, 100);
        assert!(matches!(hot.validate(), Err(ConfigError::InvalidConfig(_))));

        let nan = AgentConfig::new("gpt-4o", f32::NAN, 100);
        assert!(nan.validate().is_err());

        let no_loop = AgentConfig::default().with_max_iterations(0);
        assert!(no_loop.validate().is_err());
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
            provider = "ollama"
            model_name = "qwen3:8b"
            temperature = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.model_name, "qwen3:8b");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn toml_values_are_validated() {
        let err = AgentConfig::from_toml_str("max_tokens = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));

        let err = AgentConfig::from_toml_str("max_tokens = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AgentConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
