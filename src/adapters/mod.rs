// Adapters layer: concrete implementations for external systems (chat API, storage).

pub mod anthropic;
pub mod storage;

pub use anthropic::AnthropicClient;
pub use storage::LocalStorage;
