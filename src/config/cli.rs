use crate::adapters::anthropic::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::config::{resolved, validate_provider, API_KEY_ENV};
use crate::core::dialogue::SummaryMode;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, Parser)]
#[command(name = "chirpy")]
#[command(about = "Describe a bird you saw and let a language model classify it")]
pub struct CliConfig {
    /// Bird description for a single request; the raw model reply is printed
    #[arg(short, long)]
    pub message: Option<String>,

    /// Category the description answers (e.g. size, habitat)
    #[arg(long)]
    pub category: Option<String>,

    /// Interactive dialogue over stdin
    #[arg(long, conflicts_with = "message")]
    pub chat: bool,

    /// Also print the parsed sighting and its summary
    #[arg(long)]
    pub parse: bool,

    #[arg(long, value_enum, default_value_t = SummaryMode::Template)]
    pub summary: SummaryMode,

    /// Print the request payload without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Falls back to ANTHROPIC_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// JSON file with the allowed words per category
    #[arg(long)]
    pub vocabulary: Option<String>,

    /// Directory where chat transcripts are saved
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 沒有 --api-key 時改讀環境變數
    pub fn resolve_env(&mut self) {
        if resolved(self.api_key.as_deref()).is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok();
        }
    }
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        self.api_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn api_key(&self) -> Option<&str> {
        resolved(self.api_key.as_deref())
    }

    fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    fn vocabulary_file(&self) -> Option<&str> {
        self.vocabulary.as_deref()
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
