use crate::adapters::anthropic::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::config::{resolved, validate_provider, API_KEY_ENV};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ChirpyError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueConfig {
    pub vocabulary_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ChirpyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| ChirpyError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if resolved(config.api.api_key.as_deref()).is_none() {
            config.api.api_key = std::env::var(API_KEY_ENV).ok();
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${ANTHROPIC_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 命令列有給的值優先於檔案
    #[cfg(feature = "cli")]
    pub fn apply_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(endpoint) = &cli.api_endpoint {
            self.api.endpoint = endpoint.clone();
        }
        if let Some(api_key) = resolved(cli.api_key.as_deref()) {
            self.api.api_key = Some(api_key.to_string());
        }
        if let Some(timeout) = cli.timeout {
            self.api.timeout_seconds = Some(timeout);
        }
        if let Some(model) = &cli.model {
            self.model.name = model.clone();
        }
        if let Some(max_tokens) = cli.max_tokens {
            self.model.max_tokens = Some(max_tokens);
        }
        if let Some(temperature) = cli.temperature {
            self.model.temperature = Some(temperature);
        }
        if let Some(vocabulary) = &cli.vocabulary {
            self.dialogue.vocabulary_file = Some(vocabulary.clone());
        }
        if let Some(path) = &cli.output_path {
            self.output.path = path.clone();
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.api.endpoint
    }

    fn api_key(&self) -> Option<&str> {
        resolved(self.api.api_key.as_deref())
    }

    fn model(&self) -> &str {
        &self.model.name
    }

    fn max_tokens(&self) -> u32 {
        self.model.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn temperature(&self) -> f64 {
        self.model.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    fn vocabulary_file(&self) -> Option<&str> {
        self.dialogue.vocabulary_file.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[api]
endpoint = "https://proxy.example.com/v1/messages"
api_key = "sk-test"
timeout_seconds = 30

[model]
name = "claude-3-5-haiku-20241022"
max_tokens = 500
temperature = 0.2

[dialogue]
vocabulary_file = "words.json"

[output]
path = "./sessions"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_endpoint(), "https://proxy.example.com/v1/messages");
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.request_timeout_secs(), 30);
        assert_eq!(config.model(), "claude-3-5-haiku-20241022");
        assert_eq!(config.max_tokens(), 500);
        assert_eq!(config.temperature(), 0.2);
        assert_eq!(config.vocabulary_file(), Some("words.json"));
        assert_eq!(config.output_path(), "./sessions");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.api_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(config.output_path(), "./output");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CHIRPY_TEST_ENDPOINT", "https://test.api.com/v1/messages");

        let toml_content = r#"
[api]
endpoint = "${CHIRPY_TEST_ENDPOINT}"
api_key = "${CHIRPY_TEST_MISSING_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.endpoint, "https://test.api.com/v1/messages");
        assert_ne!(config.api_key(), Some("${CHIRPY_TEST_MISSING_KEY}"));

        std::env::remove_var("CHIRPY_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid_endpoint = TomlConfig::from_toml_str("[api]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(invalid_endpoint.validate().is_err());

        let invalid_vocabulary =
            TomlConfig::from_toml_str("[dialogue]\nvocabulary_file = \"words.csv\"\n").unwrap();
        assert!(invalid_vocabulary.validate().is_err());

        let zero_tokens = TomlConfig::from_toml_str("[model]\nmax_tokens = 0\n").unwrap();
        assert!(zero_tokens.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[model]\nname = \"file-model\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model(), "file-model");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_file_api_key_survives_env_and_cli_overrides() {
        use clap::Parser;

        std::env::set_var(API_KEY_ENV, "sk-from-env");

        let cli = crate::config::CliConfig::parse_from(["chirpy", "--message", "x"]);
        let mut config = TomlConfig::from_toml_str("[api]\napi_key = \"sk-from-file\"\n").unwrap();
        config.apply_overrides(&cli);
        assert_eq!(config.api_key(), Some("sk-from-file"));

        let explicit = crate::config::CliConfig::parse_from(["chirpy", "--api-key", "sk-from-flag"]);
        config.apply_overrides(&explicit);
        assert_eq!(config.api_key(), Some("sk-from-flag"));

        let fallback = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(fallback.api_key(), Some("sk-from-env"));

        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[model\nname = 1").unwrap_err();
        assert!(matches!(err, ChirpyError::ConfigValidationError { .. }));
    }
}
