pub mod dialogue;
pub mod prompt;
pub mod sighting;

pub use crate::domain::model::{BirdSighting, Interpretation, MessagesRequest, MessagesResponse};
pub use crate::domain::ports::{ChatClient, ConfigProvider, Storage};
pub use crate::utils::error::Result;
