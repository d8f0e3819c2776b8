//! Outbound sends through the Graph API.

use std::time::Duration;

use {
    anyhow::{Result, bail},
    secrecy::ExposeSecret,
    tracing::{debug, info, warn},
};

use {omniai_common::truncate_at_char_boundary, omniai_config::WhatsAppConfig};

/// Hard cap WhatsApp places on a text message body.
pub const MAX_TEXT_LEN: usize = 4096;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Outbound message sender for the WhatsApp Business Cloud API.
pub struct WhatsAppClient {
    phone_id: String,
    token: secrecy::Secret<String>,
    graph_base_url: String,
    client: reqwest::Client,
}

impl WhatsAppClient {
    #[must_use]
    pub fn from_config(config: &WhatsAppConfig) -> Self {
        Self {
            phone_id: config.phone_id.clone(),
            token: config.token.clone(),
            graph_base_url: config.graph_base_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn has_send_credentials(&self) -> bool {
        !self.phone_id.is_empty() && !self.token.expose_secret().is_empty()
    }

    /// Send a text message, truncated to the platform cap.
    ///
    /// Without send credentials this is a no-op, so local runs can
    /// exercise the webhook path without a Meta app.
    pub async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        if !self.has_send_credentials() {
            debug!(to, "whatsapp send skipped: credentials not configured");
            return Ok(());
        }

        let body = truncate_at_char_boundary(text, MAX_TEXT_LEN);
        info!(to, text_len = body.len(), "whatsapp outbound text send start");

        let resp = self
            .client
            .post(format!("{}/{}/messages", self.graph_base_url, self.phone_id))
            .timeout(REQUEST_TIMEOUT)
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(&serde_json::json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "text",
                "text": { "body": body },
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            warn!(%status, to, body = %body_text, "whatsapp send failed");
            bail!("WhatsApp API error HTTP {status}: {body_text}");
        }

        info!(to, "whatsapp outbound text sent");
        Ok(())
    }
}
