use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Normalized location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub coordinates: Coordinates,
}

impl Location {
    /// Location for bare coordinates, named by the coordinates themselves.
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            name: format!("{:.4},{:.4}", coordinates.lat, coordinates.lon),
            country: None,
            state: None,
            coordinates,
        }
    }
}

/// One geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchItem {
    /// Provider id, stringified
    pub id: Option<String>,
    #[serde(flatten)]
    pub location: Location,
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub wind_speed_kph: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub weather_code: Option<i64>,
    pub condition_text: Option<String>,
    pub condition_icon: Option<String>,
    /// Upstream observation time, passed through verbatim
    pub observation_time_iso: Option<String>,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastItem {
    pub date: String,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub weather_code: Option<i64>,
    pub condition_text: Option<String>,
    pub condition_icon: Option<String>,
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastItem {
    pub time_iso: String,
    pub temp_c: Option<f64>,
    pub weather_code: Option<i64>,
    pub condition_text: Option<String>,
    pub condition_icon: Option<String>,
}

/// Daily and hourly series, each aligned independently
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub daily: Vec<DailyForecastItem>,
    pub hourly: Vec<HourlyForecastItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    pub location: Location,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: Location,
    #[serde(default)]
    pub daily: Vec<DailyForecastItem>,
    #[serde(default)]
    pub hourly: Vec<HourlyForecastItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResponse {
    #[serde(default)]
    pub results: Vec<LocationSearchItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub result: Option<LocationSearchItem>,
}
