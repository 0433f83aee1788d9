use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    pub default_model: Option<String>,
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub providers: ProvidersConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("data/input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Write one `<stem>.txt` per PDF with the full extracted text.
    #[serde(default)]
    pub save_full_text: bool,
    /// Query Crossref to fill gaps (venue, DOI, year, citation count).
    #[serde(default = "default_true")]
    pub enrich: bool,
    /// Headings that mark the start of the bibliography section.
    #[serde(default = "default_reference_headings")]
    pub reference_headings: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_reference_headings() -> Vec<String> {
    crate::references::DEFAULT_HEADINGS
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            save_full_text: false,
            enrich: true,
            reference_headings: default_reference_headings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("bibcite");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}. Run 'bibcite init' first.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))?;

        // Expand environment variables in API keys
        config.expand_env_vars();

        Ok(config)
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        if let Some(ref mut provider) = self.providers.openai {
            provider.api_key = expand_env_var(&provider.api_key);
        }
        if let Some(ref mut provider) = self.providers.anthropic {
            provider.api_key = expand_env_var(&provider.api_key);
        }
        if let Some(ref mut provider) = self.providers.ollama {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Get provider configuration by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        match name.to_lowercase().as_str() {
            "openai" => self.providers.openai.as_ref(),
            "anthropic" => self.providers.anthropic.as_ref(),
            "ollama" => self.providers.ollama.as_ref(),
            _ => None,
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_var_braces() {
        // SAFETY: test is single-threaded
        unsafe { std::env::set_var("TEST_VAR_A", "value_a") };
        assert_eq!(expand_env_var("${TEST_VAR_A}"), "value_a");
        unsafe { std::env::remove_var("TEST_VAR_A") };
    }

    #[test]
    fn test_expand_env_var_dollar() {
        unsafe { std::env::set_var("TEST_VAR_B", "value_b") };
        assert_eq!(expand_env_var("$TEST_VAR_B"), "value_b");
        unsafe { std::env::remove_var("TEST_VAR_B") };
    }

    #[test]
    fn test_expand_env_var_literal() {
        assert_eq!(expand_env_var("literal_value"), "literal_value");
    }

    #[test]
    fn test_expand_env_var_missing_returns_empty() {
        assert_eq!(expand_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), "");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            default_provider = "ollama"
            default_model = "mistral"
            input_dir = "papers"
            output_dir = "out"

            [extraction]
            save_full_text = true
            enrich = false

            [providers.ollama]
            api_key = ""
            base_url = "http://localhost:11434"
            model = "mistral"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_provider, "ollama");
        assert_eq!(config.default_model.as_deref(), Some("mistral"));
        assert_eq!(config.input_dir, PathBuf::from("papers"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.extraction.save_full_text);
        assert!(!config.extraction.enrich);
    }

    #[test]
    fn test_config_default_values() {
        let toml_str = r#"
            [providers]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.input_dir, PathBuf::from("data/input"));
        assert_eq!(config.output_dir, PathBuf::from("data/output"));
        assert!(config.extraction.enrich);
        assert!(!config.extraction.save_full_text);
        assert_eq!(config.extraction.reference_headings.len(), 5);
        assert_eq!(config.extraction.reference_headings[0], "References");
    }

    #[test]
    fn test_get_provider() {
        let toml_str = r#"
            [providers.openai]
            api_key = "sk-test"
            model = "gpt-4o-mini"

            [providers.ollama]
            api_key = ""
            base_url = "http://localhost:11434"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.get_provider("openai").is_some());
        assert!(config.get_provider("ollama").is_some());
        assert!(config.get_provider("anthropic").is_none());
        assert!(config.get_provider("nonexistent").is_none());
        assert_eq!(config.get_provider("openai").unwrap().api_key, "sk-test");
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = Config {
            default_provider: "openai".into(),
            default_model: Some("gpt-4o-mini".into()),
            input_dir: "data/input".into(),
            output_dir: "data/output".into(),
            extraction: ExtractionConfig::default(),
            providers: ProvidersConfig {
                openai: Some(ProviderConfig {
                    api_key: "sk-123".into(),
                    base_url: None,
                    model: Some("gpt-4o-mini".into()),
                }),
                anthropic: None,
                ollama: None,
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.default_provider, "openai");
        assert_eq!(deserialized.providers.openai.unwrap().api_key, "sk-123");
    }
}
