#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url,
};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// CLI 與 TOML 兩種配置共用的檢查
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("api_endpoint", config.api_endpoint())?;
    validate_non_empty_string("model", config.model())?;
    validate_positive_number("max_tokens", config.max_tokens(), 1)?;
    validate_range("temperature", config.temperature(), 0.0, 1.0)?;
    validate_positive_number(
        "timeout",
        u32::try_from(config.request_timeout_secs()).unwrap_or(u32::MAX),
        1,
    )?;
    validate_path("output_path", config.output_path())?;

    if let Some(vocabulary) = config.vocabulary_file() {
        validate_path("vocabulary", vocabulary)?;
        validate_file_extension("vocabulary", vocabulary, &["json"])?;
    }

    Ok(())
}

/// `${VAR}` 未被替換時視為沒有設定
pub(crate) fn resolved(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}
