//! Endpoint-level composition of the weather and geocoding clients.
//!
//! Each method corresponds to one public operation: validate the request,
//! resolve a location when needed, fetch, and assemble the response record.

use std::sync::Arc;

use skycast_core::Config;

use crate::cache::ResponseCache;
use crate::error::WeatherError;
use crate::geocode::GeocodingClient;
use crate::http::UpstreamClient;
use crate::provider::{WeatherClient, MAX_FORECAST_DAYS, MIN_FORECAST_DAYS};
use crate::types::{
    Coordinates, CurrentWeatherResponse, ForecastResponse, Location, LocationSearchResponse,
    ReverseGeocodeResponse,
};

/// Result count used by location search
pub const SEARCH_RESULT_COUNT: i64 = 10;

/// Where to look up weather: a place name or a coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Text(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Build from optional request parts. A non-empty `q` wins over coordinates.
    pub fn from_parts(
        q: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, WeatherError> {
        if let Some(q) = q.filter(|q| !q.is_empty()) {
            return Ok(Self::Text(q.to_string()));
        }
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Self::Coordinates(Coordinates::new(lat, lon))),
            _ => Err(WeatherError::InvalidRequest(
                "Provide either 'q' or both 'lat' and 'lon' parameters.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    weather: WeatherClient,
    geocoding: GeocodingClient,
}

impl WeatherService {
    /// Build both clients over one HTTP client and the shared cache.
    pub fn new(config: &Config, cache: Arc<ResponseCache>) -> Result<Self, WeatherError> {
        let http = UpstreamClient::new(config.http.timeout(), cache)?;
        Ok(Self {
            weather: WeatherClient::new(http.clone(), &config.upstream),
            geocoding: GeocodingClient::new(http, &config.upstream),
        })
    }

    pub fn from_clients(weather: WeatherClient, geocoding: GeocodingClient) -> Self {
        Self { weather, geocoding }
    }

    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }

    pub fn geocoding(&self) -> &GeocodingClient {
        &self.geocoding
    }

    /// Turn a query into a concrete location, geocoding text queries.
    pub async fn resolve_location(&self, query: &LocationQuery) -> Result<Location, WeatherError> {
        match query {
            LocationQuery::Coordinates(coordinates) => Ok(Location::from_coordinates(*coordinates)),
            LocationQuery::Text(q) => {
                let first = self
                    .geocoding
                    .search(q, 1)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| WeatherError::LocationNotFound(q.clone()))?;

                let mut location = first.location;
                if location.name.is_empty() {
                    location.name = q.clone();
                }
                Ok(location)
            }
        }
    }

    pub async fn current_weather(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentWeatherResponse, WeatherError> {
        let location = self.resolve_location(query).await?;
        let current = self
            .weather
            .current_weather(location.coordinates.lat, location.coordinates.lon)
            .await?;

        Ok(CurrentWeatherResponse { location, current })
    }

    /// Daily and hourly forecast; `days` must be within 1..=10.
    pub async fn forecast(
        &self,
        query: &LocationQuery,
        days: i64,
    ) -> Result<ForecastResponse, WeatherError> {
        if !(MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS).contains(&days) {
            return Err(WeatherError::InvalidRequest(format!(
                "'days' must be between {} and {}.",
                MIN_FORECAST_DAYS, MAX_FORECAST_DAYS
            )));
        }

        let location = self.resolve_location(query).await?;
        let series = self
            .weather
            .forecast(location.coordinates.lat, location.coordinates.lon, days)
            .await?;

        Ok(ForecastResponse {
            location,
            daily: series.daily,
            hourly: series.hourly,
        })
    }

    /// Text search. No matches is an empty response, not an error.
    pub async fn search(&self, q: &str) -> Result<LocationSearchResponse, WeatherError> {
        if q.trim().is_empty() {
            return Err(WeatherError::InvalidRequest(
                "Query parameter 'q' is required.".to_string(),
            ));
        }

        let results = self.geocoding.search(q, SEARCH_RESULT_COUNT).await?;
        Ok(LocationSearchResponse { results })
    }

    /// Best match near the coordinates; `result` is `None` when nothing is nearby.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<ReverseGeocodeResponse, WeatherError> {
        let result = self.geocoding.reverse(lat, lon).await?;
        Ok(ReverseGeocodeResponse { result })
    }
}
