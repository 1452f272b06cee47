//! Groq summarization backend
//!
//! Talks to Groq's OpenAI-compatible chat completions endpoint. The API key
//! comes from the environment only and is never written to configuration
//! files.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SummarizerConfig;
use crate::error::{MnemoError, Result};
use crate::memory::Turn;
use crate::summarizer::Summarizer;

const SYSTEM_PROMPT: &str = "You maintain a running summary of a conversation. \
Fold the new lines into the current summary and return only the updated summary.";

/// Summarizer backed by Groq's hosted models
#[derive(Debug)]
pub struct GroqSummarizer {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: usize,
}

/// Request structure for the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

/// Message structure for the chat completions endpoint
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Token accounting reported by the API
#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl GroqSummarizer {
    /// Create a new Groq summarizer
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or HTTP client
    /// initialization fails.
    pub fn new(config: &SummarizerConfig, max_tokens: usize) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            MnemoError::Config(
                "groq summarizer requires an API key; set GROQ_API_KEY".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("mnemo/0.1.0")
            .build()
            .map_err(|e| {
                MnemoError::Summarizer(format!("failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "initialized groq summarizer: model={}, api_base={}",
            config.model,
            config.api_base
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens,
        })
    }

    fn build_prompt(previous_summary: &str, new_turns: &[Turn]) -> String {
        let mut prompt = String::from("Current summary:\n");
        if previous_summary.trim().is_empty() {
            prompt.push_str("(none)\n");
        } else {
            prompt.push_str(previous_summary);
            prompt.push('\n');
        }

        prompt.push_str("\nNew lines:\n");
        for turn in new_turns {
            prompt.push_str(&format!("User: {}\n", turn.message));
            prompt.push_str(&format!("Agent: {}\n", turn.response));
        }

        prompt.push_str("\nUpdated summary:");
        prompt
    }
}

#[async_trait]
impl Summarizer for GroqSummarizer {
    async fn summarize(&self, previous_summary: &str, new_turns: &[Turn]) -> Result<String> {
        if new_turns.is_empty() {
            return Ok(previous_summary.to_string());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(previous_summary, new_turns),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!("sending summarization request: {} new turns", new_turns.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("summarization request failed: {}", e);
                MnemoError::Summarizer(format!("summarization request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("summarizer returned error {}: {}", status, error_text);
            return Err(MnemoError::Summarizer(format!(
                "summarizer returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("failed to parse summarizer response: {}", e);
            MnemoError::Summarizer(format!("failed to parse summarizer response: {}", e))
        })?;

        if let Some(usage) = &chat.usage {
            tracing::debug!(
                "summarizer usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                MnemoError::Summarizer("summarizer response contained no choices".to_string())
            })?;

        Ok(content.trim().to_string())
    }

    fn name(&self) -> &str {
        "groq"
    }
}
