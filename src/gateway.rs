//! Gemini API gateway
//!
//! One blocking-from-the-caller's-view call: build a request, await the
//! response, hand back the generated text plus token usage. Failures are
//! typed, so callers never have to sniff an "Error..." prefix out of the text.

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Failure modes of a generation call
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to reach the Gemini API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse Gemini response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Gemini response contained no candidate text")]
    EmptyResponse,
}

/// Token usage reported by the API for one call
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A successful generation: the model's text plus its token accounting
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client for the given key and model
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
            model,
        }
    }

    /// Create a client from config (key resolved via env or config file)
    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key, config.gemini.model.clone()))
    }

    /// The model this client calls
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the generated text with token usage
    pub async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }

        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body)?;

        // Parse as raw Value with path navigation rather than strict structs;
        // the API adds and reshuffles optional fields between versions.
        let text = extract_candidate_text(&raw).ok_or(GatewayError::EmptyResponse)?;
        let usage = extract_usage(&raw);

        Ok(Generation { text, usage })
    }
}

/// Join the text parts of the first candidate, if any
fn extract_candidate_text(raw: &Value) -> Option<String> {
    let parts = raw
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(""))
    }
}

/// Pull token counts out of usageMetadata; zeroes when the field is absent
fn extract_usage(raw: &Value) -> TokenUsage {
    let meta = raw.get("usageMetadata");
    let count = |key: &str| {
        meta.and_then(|m| m.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };
    TokenUsage {
        input_tokens: count("promptTokenCount"),
        output_tokens: count("candidatesTokenCount"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_single_candidate() {
        let raw = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_candidate_text(&raw), Some("Hello world".to_string()));
    }

    #[test]
    fn missing_candidates_yield_none() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(extract_candidate_text(&raw), None);
    }

    #[test]
    fn usage_metadata_is_optional() {
        let raw = json!({
            "candidates": [{ "content": { "parts": [{ "text": "x" }] } }],
            "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 340, "totalTokenCount": 460 }
        });
        let usage = extract_usage(&raw);
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, 340);

        let without = json!({ "candidates": [] });
        let usage = extract_usage(&without);
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
    }
}
