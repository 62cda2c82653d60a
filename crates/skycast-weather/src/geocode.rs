//! Forward and reverse geocoding via the Open-Meteo geocoding API.

use std::sync::Arc;

use serde_json::Value;
use skycast_core::UpstreamConfig;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http::UpstreamClient;
use crate::key::{Endpoint, QueryParams};
use crate::normalize;
use crate::types::LocationSearchItem;

pub const MIN_SEARCH_COUNT: i64 = 1;
pub const MAX_SEARCH_COUNT: i64 = 20;

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http: UpstreamClient,
    search_url: String,
    reverse_url: String,
}

impl GeocodingClient {
    pub fn new(http: UpstreamClient, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            search_url: upstream.geocoding_search_url.clone(),
            reverse_url: upstream.geocoding_reverse_url.clone(),
        }
    }

    /// Query for a text search; `count` is clamped into 1..=20.
    pub fn search_params(query: &str, count: i64) -> QueryParams {
        QueryParams::new()
            .with("name", query)
            .with("count", count.clamp(MIN_SEARCH_COUNT, MAX_SEARCH_COUNT))
    }

    pub fn reverse_params(lat: f64, lon: f64) -> QueryParams {
        QueryParams::new().with("latitude", lat).with("longitude", lon)
    }

    /// Raw search payload.
    #[instrument(skip(self), level = "info")]
    pub async fn search_locations(&self, query: &str, count: i64) -> Result<Arc<Value>, WeatherError> {
        let params = Self::search_params(query, count);
        self.http
            .get_json(Endpoint::Search, &self.search_url, &params)
            .await
    }

    /// Raw reverse geocoding payload.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Arc<Value>, WeatherError> {
        let params = Self::reverse_params(lat, lon);
        self.http
            .get_json(Endpoint::Reverse, &self.reverse_url, &params)
            .await
    }

    /// Matches for `query`, possibly none.
    pub async fn search(&self, query: &str, count: i64) -> Result<Vec<LocationSearchItem>, WeatherError> {
        let data = self.search_locations(query, count).await?;
        normalize::parse_search_results(&data)
    }

    /// Closest place to the coordinates, `None` over open water and the like.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<LocationSearchItem>, WeatherError> {
        let data = self.reverse_geocode(lat, lon).await?;
        normalize::parse_reverse_result(&data)
    }
}
