use crate::core::prompt::{interpretation_prompt, summary_prompt, Vocabulary};
use crate::core::sighting::NO_INFORMATION;
use crate::domain::model::{
    BirdSighting, Interpretation, Message, MessagesRequest, Transcript, TurnRecord,
};
use crate::domain::ports::{ChatClient, ConfigProvider, Storage};
use crate::utils::error::{ChirpyError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::Utc;

pub const TRANSCRIPT_FILE: &str = "transcripts.json";

/// 每次請求共用的模型參數
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl RequestSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            model: config.model().to_string(),
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
        }
    }

    pub fn request(&self, prompt: String) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message::user_text(prompt)],
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        use crate::adapters::anthropic::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SummaryMode {
    /// 固定句型，不呼叫模型
    #[default]
    Template,
    /// 再呼叫一次模型寫出口語化摘要
    Model,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub raw: String,
    pub sighting: BirdSighting,
    pub next_category: Option<String>,
    pub summary: String,
}

/// 鳥類辨識對話：每一輪把使用者描述交給模型分類，再併入目前的特徵
pub struct Dialogue<C: ChatClient> {
    client: C,
    settings: RequestSettings,
    vocabulary: Vocabulary,
    state: BirdSighting,
    pending_category: Option<String>,
    declined: Vec<String>,
    turns: Vec<TurnRecord>,
    started_at: chrono::DateTime<Utc>,
}

impl<C: ChatClient> Dialogue<C> {
    pub fn new(client: C, settings: RequestSettings, vocabulary: Vocabulary) -> Self {
        Self {
            client,
            settings,
            vocabulary,
            state: BirdSighting::default(),
            pending_category: None,
            declined: Vec::new(),
            turns: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// 指定下一輪要當作回答的類別
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.pending_category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn build_request(&self, user_input: &str, category_prompt: Option<&str>) -> MessagesRequest {
        self.settings
            .request(interpretation_prompt(user_input, category_prompt, &self.vocabulary))
    }

    /// 單次往返：送出分類提示詞，回傳原始回覆與解析結果
    pub async fn interpret(
        &self,
        user_input: &str,
        category_prompt: Option<&str>,
    ) -> Result<Interpretation> {
        let request = self.build_request(user_input, category_prompt);
        let response = self.client.send(&request).await?;
        let raw = response.text()?;
        let sighting = BirdSighting::from_xml(&raw);

        tracing::debug!(
            "Interpreted {} categories and {} new attributes",
            sighting.categories.len(),
            sighting.new_attribute.len()
        );

        Ok(Interpretation { raw, sighting })
    }

    pub async fn turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        validate_non_empty_string("message", user_input).map_err(|_| ChirpyError::ValidationError {
            message: "Bird description cannot be empty".to_string(),
        })?;

        let asked = self.pending_category.clone();
        let interpretation = self.interpret(user_input, asked.as_deref()).await?;

        let before = self.state.clone();
        self.state.merge(&interpretation.sighting);

        // 問了某個類別卻沒有得到新資訊，就不再重複詢問
        if self.state == before {
            if let Some(category) = &asked {
                tracing::info!("No new information for '{}', not asking again", category);
                if !self.declined.contains(category) {
                    self.declined.push(category.clone());
                }
            }
        }

        self.turns.push(TurnRecord {
            text: user_input.to_string(),
            asked_category: asked,
            categories_described: interpretation.sighting.categories.clone(),
            new_attribute: interpretation.sighting.new_attribute.clone(),
            length: user_input.split_whitespace().count(),
        });

        self.pending_category = self.next_category();

        Ok(TurnOutcome {
            raw: interpretation.raw,
            sighting: interpretation.sighting,
            next_category: self.pending_category.clone(),
            summary: self.template_summary(),
        })
    }

    /// 詞彙表中第一個尚未描述、也未被略過的類別
    pub fn next_category(&self) -> Option<String> {
        self.vocabulary
            .categories()
            .find(|category| {
                !self.state.describes(category) && !self.declined.iter().any(|d| d == category)
            })
            .map(str::to_string)
    }

    pub async fn summarize(&self, mode: SummaryMode) -> Result<String> {
        if self.state.categories.is_empty() {
            return Ok(NO_INFORMATION.to_string());
        }

        match mode {
            SummaryMode::Template => Ok(self.template_summary()),
            SummaryMode::Model => {
                let request = self.settings.request(summary_prompt(&self.state)?);
                let response = self.client.send(&request).await?;
                Ok(response.text()?.trim().to_string())
            }
        }
    }

    fn template_summary(&self) -> String {
        let summary = self.state.hard_summary();
        if summary.is_empty() {
            NO_INFORMATION.to_string()
        } else {
            summary
        }
    }

    pub fn state(&self) -> &BirdSighting {
        &self.state
    }

    pub fn pending_category(&self) -> Option<&str> {
        self.pending_category.as_deref()
    }

    pub fn declined_categories(&self) -> &[String] {
        &self.declined
    }

    pub fn transcript(&self, summary: Option<String>) -> Transcript {
        let average_message_length = if self.turns.is_empty() {
            0.0
        } else {
            self.turns.iter().map(|t| t.length).sum::<usize>() as f64 / self.turns.len() as f64
        };

        Transcript {
            started_at: self.started_at,
            conversation: self.turns.clone(),
            final_categories: self.state.clone(),
            declined_categories: self.declined.clone(),
            summary,
            average_message_length,
        }
    }

    /// 把這次對話附加到 `transcripts.json`
    pub async fn save_transcript<S: Storage>(
        &self,
        storage: &S,
        summary: Option<String>,
    ) -> Result<usize> {
        let mut sessions: Vec<serde_json::Value> = match storage.read_file(TRANSCRIPT_FILE).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(ChirpyError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };

        sessions.push(serde_json::to_value(self.transcript(summary))?);
        let data = serde_json::to_vec_pretty(&sessions)?;
        storage.write_file(TRANSCRIPT_FILE, &data).await?;

        tracing::debug!("Saved transcript #{} ({} turns)", sessions.len(), self.turns.len());
        Ok(sessions.len())
    }
}
