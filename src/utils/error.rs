use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChirpyError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    ApiStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Response parsing error: {message}")]
    ResponseParsingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChirpyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChirpyError::ApiError(_) | ChirpyError::ApiStatusError { .. } => ErrorCategory::Network,
            ChirpyError::ConfigError { .. }
            | ChirpyError::MissingConfigError { .. }
            | ChirpyError::InvalidConfigValueError { .. }
            | ChirpyError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ChirpyError::SerializationError(_)
            | ChirpyError::ResponseParsingError { .. }
            | ChirpyError::ValidationError { .. } => ErrorCategory::Data,
            ChirpyError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 429 / 5xx / 529 都是暫時性的，稍後重跑即可
            ChirpyError::ApiStatusError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            ChirpyError::ApiError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            ChirpyError::ApiError(_) | ChirpyError::ApiStatusError { .. } => ErrorSeverity::High,
            ChirpyError::ResponseParsingError { .. } | ChirpyError::ValidationError { .. } => {
                ErrorSeverity::High
            }
            ChirpyError::SerializationError(_) => ErrorSeverity::High,
            ChirpyError::ConfigError { .. }
            | ChirpyError::MissingConfigError { .. }
            | ChirpyError::InvalidConfigValueError { .. }
            | ChirpyError::ConfigValidationError { .. } => ErrorSeverity::High,
            ChirpyError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ChirpyError::ApiError(e) if e.is_timeout() => {
                "The API did not answer in time; try again in a moment".to_string()
            }
            ChirpyError::ApiError(_) => {
                "Check your network connection and the configured API endpoint".to_string()
            }
            ChirpyError::ApiStatusError { status: 401, .. } => {
                "Check that ANTHROPIC_API_KEY holds a valid key".to_string()
            }
            ChirpyError::ApiStatusError { status: 429, .. } => {
                "Rate limited by the API; wait before sending another description".to_string()
            }
            ChirpyError::ApiStatusError { status, .. } if *status >= 500 => {
                "The API is having trouble; try again later".to_string()
            }
            ChirpyError::ApiStatusError { .. } => {
                "Check the model name and request settings".to_string()
            }
            ChirpyError::MissingConfigError { field } => {
                format!("Provide a value for '{}' (flag, config file or environment)", field)
            }
            ChirpyError::InvalidConfigValueError { field, .. }
            | ChirpyError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            ChirpyError::ConfigError { .. } => "Review the configuration file".to_string(),
            ChirpyError::ResponseParsingError { .. } => {
                "The model answered in an unexpected shape; run again".to_string()
            }
            ChirpyError::ValidationError { .. } => "Check the provided input".to_string(),
            ChirpyError::SerializationError(_) => {
                "Check that JSON files are well formed".to_string()
            }
            ChirpyError::IoError(_) => {
                "Check file paths and permissions for the output directory".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to the bird expert: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 根據嚴重程度決定 CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChirpyError>;
