use std::time::Duration;

use {
    anyhow::{Result, anyhow, bail},
    secrecy::ExposeSecret,
    tracing::{debug, warn},
};

use crate::model::ChatMessage;

/// Timeout applied to every completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the OpenAI Chat Completions API (and compatible servers).
pub struct OpenAiClient {
    api_key: secrecy::Secret<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: secrecy::Secret<String>, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Model id sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a single non-streaming completion and return the assistant text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let openai_messages: Vec<serde_json::Value> =
            messages.iter().map(ChatMessage::to_openai_value).collect();
        let body = serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
        });

        debug!(
            model = %self.model,
            messages_count = messages.len(),
            "openai complete request"
        );

        let http_resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            warn!(status = %status, model = %self.model, body = %body_text, "openai API error");
            bail!("OpenAI API error HTTP {status}: {body_text}");
        }

        let resp = http_resp.json::<serde_json::Value>().await?;
        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("openai response missing message content"))
    }
}
