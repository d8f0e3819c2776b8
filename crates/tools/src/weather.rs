use {anyhow::Result, tracing::debug};

use crate::REQUEST_TIMEOUT;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://wttr.in";

/// One-line weather conditions from wttr.in (`?format=3`).
pub struct WeatherClient {
    base_url: String,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the current conditions for a city as a single trimmed line,
    /// e.g. `Dubai: ☀️ +38°C`.
    pub async fn current_line(&self, city: &str) -> Result<String> {
        debug!(city, "weather fetch");
        let text = self
            .client
            .get(format!("{}/{city}", self.base_url))
            .query(&[("format", "3")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }
}
