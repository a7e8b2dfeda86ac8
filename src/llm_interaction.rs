use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("failed to send request to completion API at {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("completion API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to parse completion API response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("completion API returned no choices")]
    Empty,
}

// Structures matching the OpenAI-compatible /chat/completions endpoint
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
    // usage, id, timings, etc. are ignored
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for a hosted chat completion API (Groq by default).
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    chat_url: String,
    model: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(client: Client, config: &Config) -> Self {
        let base = config.groq_base_url.trim_end_matches('/');
        Self {
            client,
            chat_url: format!("{base}/chat/completions"),
            model: config.model.clone(),
            api_key: config.groq_api_key.clone(),
        }
    }

    /// Sends `prompt` as a single user turn and returns the generated text.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request_payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(?prompt, "Sending completion request");

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&request_payload)
            .send()
            .await
            .map_err(|source| CompletionError::Request {
                url: self.chat_url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Completion API request failed");
            return Err(CompletionError::Status { status, body });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(CompletionError::Decode)?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::Empty)?;

        debug!(response = ?text, "Received completion");

        Ok(text.trim().to_string())
    }
}
