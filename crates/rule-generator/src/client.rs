//! OpenAI-compatible completions client.

use std::time::Duration;

use clipsmith_common::config::RuleGeneratorConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::edit::RuleText;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Completion request body.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

/// Completion response body. Only the fields we read.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

/// Rule generation client.
///
/// A missing API key is not an error at construction; it is reported by
/// [`generate`](Self::generate) so each file fails on its own.
pub struct RuleGeneratorClient {
    client: Client,
    completions_url: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
    api_key_env: String,
}

impl RuleGeneratorClient {
    /// Build a client, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &RuleGeneratorConfig) -> ClipsmithResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit API key.
    pub fn with_api_key(
        config: &RuleGeneratorConfig,
        api_key: Option<String>,
    ) -> ClipsmithResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| ClipsmithError::generation(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            completions_url: format!("{}/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request editing rules for `prompt`.
    ///
    /// The first completion, trimmed, is the rule text; an empty string is a
    /// valid answer. Transport failures, non-success statuses, unreadable
    /// bodies and empty choice lists are generation errors.
    pub async fn generate(&self, prompt: &str) -> ClipsmithResult<RuleText> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ClipsmithError::generation(format!("{} is not set", self.api_key_env))
        })?;

        tracing::info!(
            url = %self.completions_url,
            model = %self.model,
            max_tokens = self.max_tokens,
            "Requesting editing rules"
        );

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClipsmithError::generation(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClipsmithError::generation(format!(
                "Completion service returned {status}: {}",
                error_text.trim()
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            ClipsmithError::generation(format!("Failed to parse completion response: {e}"))
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or_else(|| ClipsmithError::generation("Completion response has no choices"))?;

        tracing::debug!(chars = text.len(), lines = text.lines().count(), "Rules received");
        Ok(RuleText::new(text))
    }
}

impl std::fmt::Debug for RuleGeneratorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleGeneratorClient")
            .field("completions_url", &self.completions_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_joins_endpoint() {
        let config = RuleGeneratorConfig {
            endpoint: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        let client = RuleGeneratorClient::with_api_key(&config, None).unwrap();
        assert_eq!(client.completions_url, "http://localhost:8080/v1/completions");
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = RuleGeneratorClient::with_api_key(
            &RuleGeneratorConfig::default(),
            Some("sk-secret".to_string()),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_response_tolerates_extra_fields() {
        let raw = r#"{"id":"cmpl-1","object":"text_completion","choices":[{"text":"\nslow motion\n","index":0,"finish_reason":"stop"}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].text.trim(), "slow motion");
    }
}
