pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{AnthropicClient, LocalStorage};
pub use self::core::dialogue::{Dialogue, RequestSettings, SummaryMode, TurnOutcome};
pub use self::core::prompt::Vocabulary;
pub use domain::model::BirdSighting;
pub use utils::error::{ChirpyError, Result};
