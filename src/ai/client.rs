use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// One model reply with its token accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The seam between the gateway and a concrete model API. Tests stub this;
/// production uses [`GeminiClient`].
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<Completion, ModelError>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiReplyContent,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

/// Blocking Gemini client. Calls are individually bounded by the timeout;
/// a timeout surfaces as an ordinary [`ModelError::Http`] and degrades to
/// the deterministic fallback upstream, never failing the task.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }
}

impl LanguageModel for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<Completion, ModelError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(GEMINI_API_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GeminiResponse = response.json()?;

        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or(ModelError::EmptyContent)?;

        let usage = reply.usage_metadata.unwrap_or(GeminiUsage {
            prompt_token_count: 0,
            candidates_token_count: 0,
        });

        log::debug!(
            "Model call succeeded: input_tokens={}, output_tokens={}",
            usage.prompt_token_count,
            usage.candidates_token_count
        );

        Ok(Completion {
            text,
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"q1\": \"Yes\"}"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8}
        }"#;

        let reply: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.candidates[0].content.parts[0].text.as_deref(),
            Some("{\"q1\": \"Yes\"}")
        );
        let usage = reply.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 120);
        assert_eq!(usage.candidates_token_count, 8);
    }

    #[test]
    fn test_response_without_usage() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "7"}]}}]}"#;
        let reply: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(reply.usage_metadata.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: "hello" }],
            }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#);
    }
}
