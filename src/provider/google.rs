// src/provider/google.rs — Google Generative AI (Gemini) provider

use async_trait::async_trait;
use std::time::Duration;

use super::TextGenerator;
use crate::infra::errors::BioAstraError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn error(&self, message: impl Into<String>) -> BioAstraError {
        BioAstraError::Generation {
            provider: "google".into(),
            message: message.into(),
        }
    }

    /// Build the Gemini request body: a single user turn.
    fn build_request_body(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        })
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(resp: &serde_json::Value) -> Option<String> {
    let parts = resp["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl TextGenerator for GoogleProvider {
    fn id(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, BioAstraError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&Self::build_request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.error(format!("timed out after {}s", self.timeout.as_secs()))
                } else {
                    self.error(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {}", e.without_url())))?;

        extract_text(&resp).ok_or_else(|| {
            let reason = resp["candidates"][0]["finishReason"]
                .as_str()
                .or_else(|| resp["promptFeedback"]["blockReason"].as_str())
                .unwrap_or("no text in response");
            self.error(format!("Empty response ({reason})"))
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, BioAstraError> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.error(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse model list: {}", e.without_url())))?;

        Ok(resp["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_single_user_turn() {
        let body = GoogleProvider::build_request_body("hi there");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi there");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&resp).as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_extract_text_missing() {
        assert!(extract_text(&json!({})).is_none());
        let blocked = json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
        });
        assert!(extract_text(&blocked).is_none());
    }

    #[test]
    fn test_builder_trims_base_url() {
        let p = GoogleProvider::new("k".into(), "gemini-2.5-flash".into())
            .with_base_url("http://localhost:9999/v1beta/".into());
        assert_eq!(p.base_url, "http://localhost:9999/v1beta");
        assert_eq!(p.model(), "gemini-2.5-flash");
        assert_eq!(p.id(), "google");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_generation_error() {
        let p = GoogleProvider::new("k".into(), "m".into())
            .with_base_url("http://127.0.0.1:1".into())
            .with_timeout(Duration::from_secs(2));
        let err = p.generate("hi").await.unwrap_err();
        assert_eq!(err.kind(), "generation");
    }
}
