use {
    anyhow::{Result, bail},
    tracing::debug,
    url::Url,
};

use {crate::REQUEST_TIMEOUT, omniai_common::truncate_at_char_boundary};

/// Cap on fetched page text forwarded into an LLM prompt.
pub const MAX_PAGE_CHARS: usize = 20_000;

/// Fetches a web page as raw text, capped so it fits in a prompt.
pub struct PageFetcher {
    max_chars: usize,
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::with_max_chars(MAX_PAGE_CHARS)
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the body of `url_str`, truncated to the configured cap.
    ///
    /// Only `http` and `https` URLs are accepted.
    pub async fn fetch_text(&self, url_str: &str) -> Result<String> {
        let url = Url::parse(url_str)?;

        match url.scheme() {
            "http" | "https" => {},
            s => bail!("unsupported URL scheme: {s}"),
        }

        debug!(url = %url, "page fetch");
        let body = self
            .client
            .get(url.as_str())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;
        Ok(truncate_at_char_boundary(&body, self.max_chars).to_string())
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}
