//! Open-Meteo forecast client.

use std::sync::Arc;

use serde_json::Value;
use skycast_core::UpstreamConfig;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http::UpstreamClient;
use crate::key::{Endpoint, QueryParams};
use crate::normalize;
use crate::types::{CurrentWeather, ForecastSeries};

pub const MIN_FORECAST_DAYS: i64 = 1;
pub const MAX_FORECAST_DAYS: i64 = 10;
pub const DEFAULT_FORECAST_DAYS: i64 = 3;

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";
const HOURLY_FIELDS: &str = "weathercode,temperature_2m";

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: UpstreamClient,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new(http: UpstreamClient, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            forecast_url: upstream.forecast_url.clone(),
        }
    }

    /// Query for the current conditions section.
    pub fn current_weather_params(lat: f64, lon: f64) -> QueryParams {
        QueryParams::new()
            .with("latitude", lat)
            .with("longitude", lon)
            .with("current_weather", true)
            .with("hourly", HOURLY_FIELDS)
            .with("timezone", "auto")
    }

    /// Query for daily and hourly series; `days` is clamped into 1..=10.
    pub fn forecast_params(lat: f64, lon: f64, days: i64) -> QueryParams {
        QueryParams::new()
            .with("latitude", lat)
            .with("longitude", lon)
            .with("daily", DAILY_FIELDS)
            .with("hourly", HOURLY_FIELDS)
            .with("forecast_days", days.clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS))
            .with("timezone", "auto")
    }

    /// Raw forecast payload including the `current_weather` section.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current_weather(&self, lat: f64, lon: f64) -> Result<Arc<Value>, WeatherError> {
        let params = Self::current_weather_params(lat, lon);
        self.http
            .get_json(Endpoint::Current, &self.forecast_url, &params)
            .await
    }

    /// Raw forecast payload with daily and hourly sections.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        days: i64,
    ) -> Result<Arc<Value>, WeatherError> {
        let params = Self::forecast_params(lat, lon, days);
        self.http
            .get_json(Endpoint::Forecast, &self.forecast_url, &params)
            .await
    }

    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<CurrentWeather, WeatherError> {
        let data = self.fetch_current_weather(lat, lon).await?;
        normalize::parse_current_weather(&data)
    }

    pub async fn forecast(&self, lat: f64, lon: f64, days: i64) -> Result<ForecastSeries, WeatherError> {
        let data = self.fetch_forecast(lat, lon, days).await?;
        normalize::parse_forecast(&data)
    }
}
