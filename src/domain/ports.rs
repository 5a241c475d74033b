use crate::domain::model::{MessagesRequest, MessagesResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn max_tokens(&self) -> u32;
    fn temperature(&self) -> f64;
    fn request_timeout_secs(&self) -> u64;
    fn vocabulary_file(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
}

/// 對聊天補全服務的一次請求/回應往返
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse>;
}
