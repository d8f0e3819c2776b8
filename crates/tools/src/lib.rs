//! Outbound fetch helpers used when composing replies.
//!
//! Weather lines come from wttr.in, page bodies from a plain HTTP GET
//! capped to a size an LLM prompt can absorb.

use std::time::Duration;

pub mod weather;
pub mod web_fetch;

pub use {
    weather::{DEFAULT_WEATHER_BASE_URL, WeatherClient},
    web_fetch::{MAX_PAGE_CHARS, PageFetcher},
};

/// Timeout applied to every outbound fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
