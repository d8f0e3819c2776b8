//! Collaborator clients, constructed once at startup.

use {
    omniai_config::AppConfig,
    omniai_llm::OpenAiClient,
    omniai_tools::{DEFAULT_WEATHER_BASE_URL, PageFetcher, WeatherClient},
    omniai_whatsapp::WhatsAppClient,
};

/// Everything the router needs to produce and deliver replies.
///
/// Built explicitly from config and passed down, so tests can swap in
/// clients pointed at local mock servers.
pub struct AppContext {
    pub home_city: String,
    pub llm: OpenAiClient,
    pub weather: WeatherClient,
    pub fetcher: PageFetcher,
    pub sender: WhatsAppClient,
}

impl AppContext {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            home_city: config.home_city.clone(),
            llm: OpenAiClient::new(
                config.openai.api_key.clone(),
                config.openai.model.clone(),
                config.openai.base_url.clone(),
            ),
            weather: WeatherClient::new(DEFAULT_WEATHER_BASE_URL.to_string()),
            fetcher: PageFetcher::new(),
            sender: WhatsAppClient::from_config(&config.whatsapp),
        }
    }
}
