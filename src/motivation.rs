//! Motivational messages from a chat-completion API.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::AppError;

/// Body of `POST /motivation/congratulate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motivation {
    pub title: String,
    pub personality: String,
}

pub fn encourage_prompt(title: &str, personality: &str) -> String {
    format!(
        "encourage me to complete {} as if you are {}. The response should be no longer than three sentences",
        title, personality
    )
}

pub fn congratulate_prompt(title: &str, personality: &str) -> String {
    format!(
        "give me a  motivational message to congratulate me on completing {} as if you are {}. it should be no longer than three sentences",
        title, personality
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub n: u32,
    pub temperature: f64,
}

impl ChatRequest {
    /// A single-choice request carrying one user message.
    pub fn single(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            n: 1,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next().map(|c| c.message.content)
    }
}

/// Turns a prompt into a reply. `Ok(None)` means the API answered with no choices.
#[async_trait]
pub trait Motivator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, AppError>;
}

pub struct OpenAiClient {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Motivator for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, AppError> {
        let request = ChatRequest::single(&self.model, prompt);
        debug!("Requesting chat completion from {}", self.api_url);

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response: ChatResponse = builder.send().await?.error_for_status()?.json().await?;
        Ok(response.first_content())
    }
}

/// Answers every prompt with a fixed reply and remembers the prompts it saw.
#[derive(Clone, Default)]
pub struct CannedMotivator {
    reply: Option<String>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl CannedMotivator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Arc::default(),
        }
    }

    /// Behaves like an API that returns an empty choice list.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }
}

#[async_trait]
impl Motivator for CannedMotivator {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, AppError> {
        self.prompts.write().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}
