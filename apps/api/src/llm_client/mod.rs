/// LLM Client — the single point of entry for all Doubao API calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// All LLM interactions MUST go through this module.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The model used for all analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "doubao-seed-1-6-thinking-250715";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// The single LLM client used by all services.
/// Wraps the Doubao chat-completions API with retry logic plus a streaming
/// entry point consumed by the relay pipeline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_url,
            api_key,
        }
    }

    /// One-shot (non-streaming) chat completion returning the full content.
    /// Retries on 429 and 5xx with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let chat_response: ChatResponse = response.json().await?;
            let content = chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.is_empty())
                .ok_or(LlmError::EmptyContent)?;

            debug!("LLM call succeeded, {} chars", content.chars().count());
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Opens a streaming chat completion. Returns the live response whose
    /// body is the provider SSE stream; non-2xx statuses are surfaced here
    /// so the relay only ever sees a healthy stream. No retries: a failed
    /// stream is the caller's retry decision.
    pub async fn open_stream(&self, prompt: &str) -> Result<reqwest::Response, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serializes_stream_flag() {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "分析一下",
            }],
            stream: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["model"], MODEL);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_response_content_extraction() {
        let body = r#"{"choices":[{"message":{"content":"分析结果"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("分析结果"));
    }

    #[test]
    fn test_chat_response_tolerates_missing_choices() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.choices.is_empty());
    }
}
