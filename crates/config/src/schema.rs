use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Chat-completions endpoint base when `OPENAI_BASE_URL` is unset.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for every completion when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Graph API base for outbound sends when `GRAPH_BASE_URL` is unset.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v20.0";

/// City used for the morning brief when `HOME_CITY` is unset.
pub const DEFAULT_HOME_CITY: &str = "Dubai";

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub whatsapp: WhatsAppConfig,
    pub server: ServerConfig,
    /// City used for the `brief` morning report.
    pub home_city: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            whatsapp: WhatsAppConfig::default(),
            server: ServerConfig::default(),
            home_city: DEFAULT_HOME_CITY.into(),
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// Recognized variables: `OPENAI_API_KEY`, `OPENAI_MODEL`,
    /// `OPENAI_BASE_URL`, `WHATSAPP_PHONE_ID`, `WHATSAPP_TOKEN`,
    /// `WHATSAPP_VERIFY_TOKEN`, `WHATSAPP_APP_SECRET`, `GRAPH_BASE_URL`,
    /// `HOME_CITY`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(key) = env_nonempty("OPENAI_API_KEY") {
            config.openai.api_key = Secret::new(key);
        }
        if let Some(model) = env_nonempty("OPENAI_MODEL") {
            config.openai.model = model;
        }
        if let Some(base_url) = env_nonempty("OPENAI_BASE_URL") {
            config.openai.base_url = base_url;
        }
        if let Some(phone_id) = env_nonempty("WHATSAPP_PHONE_ID") {
            config.whatsapp.phone_id = phone_id;
        }
        if let Some(token) = env_nonempty("WHATSAPP_TOKEN") {
            config.whatsapp.token = Secret::new(token);
        }
        if let Some(token) = env_nonempty("WHATSAPP_VERIFY_TOKEN") {
            config.whatsapp.verify_token = Secret::new(token);
        }
        config.whatsapp.app_secret = env_nonempty("WHATSAPP_APP_SECRET").map(Secret::new);
        if let Some(base_url) = env_nonempty("GRAPH_BASE_URL") {
            config.whatsapp.graph_base_url = base_url;
        }
        if let Some(city) = env_nonempty("HOME_CITY") {
            config.home_city = city;
        }
        config
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// OpenAI chat-completions settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; completions fail per-message when left empty.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
        }
    }
}

/// WhatsApp Business Cloud API settings (webhook + send).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    /// Business phone number ID used in the send URL path.
    pub phone_id: String,
    /// Graph API access token for outbound sends.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
    /// Shared secret echoed back during the webhook verification handshake.
    #[serde(serialize_with = "serialize_secret")]
    pub verify_token: Secret<String>,
    /// App secret for `X-Hub-Signature-256` checks; unset skips the check.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_secret: Option<Secret<String>>,
    pub graph_base_url: String,
}

impl WhatsAppConfig {
    /// Whether outbound sends are possible (phone ID and token both set).
    #[must_use]
    pub fn has_send_credentials(&self) -> bool {
        !self.phone_id.is_empty() && !self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("phone_id", &self.phone_id)
            .field("token", &"[REDACTED]")
            .field("verify_token", &"[REDACTED]")
            .field("graph_base_url", &self.graph_base_url)
            .finish_non_exhaustive()
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            phone_id: String::new(),
            token: Secret::new(String::new()),
            verify_token: Secret::new(String::new()),
            app_secret: None,
            graph_base_url: DEFAULT_GRAPH_BASE_URL.into(),
        }
    }
}

/// HTTP listener settings. Overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
