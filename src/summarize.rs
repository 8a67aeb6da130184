//! Text-transform collaborator: condensing an article body into a short
//! natural-language summary.
//!
//! This is an external service boundary. Failures never propagate: short
//! input gets a fixed placeholder without a service call, and an
//! unreachable or erroring service gets a fixed placeholder instead of an
//! error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::TARGET_WEB_REQUEST;

pub const INSUFFICIENT_CONTENT: &str = "Not enough content to summarize.";
pub const UNAVAILABLE: &str = "Summary unavailable.";

const MIN_INPUT_CHARS: usize = 50;
const MAX_INPUT_CHARS: usize = 4000;
const MAX_SUMMARY_TOKENS: u32 = 150;

const SYSTEM_PROMPT: &str = "You condense news articles. Summarize the key points of the \
                             following text in three or four short sentences, keeping every \
                             concrete fact.";

#[async_trait]
pub trait Summarize: Send + Sync {
    async fn condense(&self, text: &str) -> String;
}

/// Placeholder implementation used when no API key is configured.
pub struct StubSummarizer;

#[async_trait]
impl Summarize for StubSummarizer {
    async fn condense(&self, text: &str) -> String {
        if text.chars().count() < MIN_INPUT_CHARS {
            return INSUFFICIENT_CONTENT.to_string();
        }
        format!(
            "Condensed summary disabled (no API key configured); article body is {} characters.",
            text.chars().count()
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpSummarizer {
    pub fn new(base_url: String, api_key: String, model: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build summarizer client: {}", e))?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    async fn request_summary(&self, text: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_SUMMARY_TOKENS,
            temperature: 0.3,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("summarizer returned HTTP {}", status);
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("summarizer returned no choices"))
    }
}

#[async_trait]
impl Summarize for HttpSummarizer {
    async fn condense(&self, text: &str) -> String {
        if text.chars().count() < MIN_INPUT_CHARS {
            return INSUFFICIENT_CONTENT.to_string();
        }

        let input = truncate_input(text);
        match self.request_summary(&input).await {
            Ok(summary) if !summary.is_empty() => summary,
            Ok(_) => UNAVAILABLE.to_string(),
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Summarizer call failed: {}", err);
                UNAVAILABLE.to_string()
            }
        }
    }
}

fn truncate_input(text: &str) -> String {
    text.chars().take(MAX_INPUT_CHARS).collect()
}
