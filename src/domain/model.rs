use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 類別名稱 -> 形容詞清單，保留模型輸出的順序
pub type CategoryMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// tool_use、thinking 等這裡用不到的區塊
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// Messages API 請求本體
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Messages API 回應本體
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub role: Role,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// 一次對話中累積的鳥類特徵
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BirdSighting {
    #[serde(flatten)]
    pub categories: CategoryMap,
    /// 詞彙表以外、但與辨識有關的特徵，例如叫聲或飛行速度
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub new_attribute: CategoryMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// 單次模型往返的結果：原始回覆與解析後的特徵
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub raw: String,
    pub sighting: BirdSighting,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub text: String,
    pub asked_category: Option<String>,
    pub categories_described: CategoryMap,
    pub new_attribute: CategoryMap,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub started_at: DateTime<Utc>,
    pub conversation: Vec<TurnRecord>,
    pub final_categories: BirdSighting,
    pub declined_categories: Vec<String>,
    pub summary: Option<String>,
    pub average_message_length: f64,
}
