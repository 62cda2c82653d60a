//! Weather and geocoding for Skycast
//!
//! Fetches from the Open-Meteo APIs through a shared TTL response cache and
//! normalizes the payloads into stable record types.

pub mod cache;
pub mod condition;
pub mod error;
pub mod geocode;
pub mod http;
pub mod key;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{Clock, ManualClock, ResponseCache, SystemClock};
pub use condition::{classify, Condition};
pub use error::WeatherError;
pub use geocode::GeocodingClient;
pub use http::UpstreamClient;
pub use key::{CacheKey, Endpoint, ParamValue, QueryParams};
pub use provider::{WeatherClient, DEFAULT_FORECAST_DAYS};
pub use service::{LocationQuery, WeatherService};
pub use types::*;
