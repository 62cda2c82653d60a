//! Mapping of raw Open-Meteo payloads into the stable record types.
//!
//! Each payload is first deserialized into a `Raw*` struct whose fields are
//! all optional, then mapped. Forecast payloads are read one top-level
//! section at a time. Missing sections and arrays read as empty;
//! only fields the records cannot do without (coordinates, current
//! temperature) produce [`WeatherError::Format`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::condition::classify;
use crate::error::WeatherError;
use crate::types::{
    Coordinates, CurrentWeather, DailyForecastItem, ForecastSeries, HourlyForecastItem, Location,
    LocationSearchItem,
};

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct RawPlaces {
    #[serde(default, deserialize_with = "null_as_empty")]
    results: Vec<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    id: Option<Value>,
    name: Option<String>,
    country: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
    latitude: Option<Value>,
    longitude: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawCurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    winddirection: Option<f64>,
    weathercode: Option<f64>,
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDaily {
    #[serde(default, deserialize_with = "null_as_empty")]
    time: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    weathercode: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHourly {
    #[serde(default, deserialize_with = "null_as_empty")]
    time: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    weathercode: Vec<Option<f64>>,
}

/// Deserialize a whole payload; a JSON `null` body reads as an empty payload.
fn parse_body<'a, T>(body: &'a Value, what: &str) -> Result<T, WeatherError>
where
    T: Deserialize<'a> + Default,
{
    if body.is_null() {
        return Ok(T::default());
    }
    T::deserialize(body).map_err(|e| WeatherError::format(format!("{} payload: {}", what, e)))
}

/// Deserialize one top-level section of a payload.
///
/// Other sections are never looked at. A missing or null section is `None`.
fn parse_section<'a, T>(body: &'a Value, name: &str) -> Result<Option<T>, WeatherError>
where
    T: Deserialize<'a>,
{
    let section = match body {
        Value::Null => return Ok(None),
        Value::Object(map) => map.get(name),
        _ => return Err(WeatherError::format("payload is not a JSON object")),
    };

    match section {
        None | Some(Value::Null) => Ok(None),
        Some(section) => T::deserialize(section)
            .map(Some)
            .map_err(|e| WeatherError::format(format!("{} section: {}", name, e))),
    }
}

/// Weather codes arrive as JSON numbers; integral floats are accepted.
fn parse_code(raw: Option<f64>) -> Result<Option<i64>, WeatherError> {
    match raw {
        None => Ok(None),
        Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(v) => Err(WeatherError::format(format!("weather code {} is not an integer", v))),
    }
}

/// Coordinates may be JSON numbers or numeric strings.
fn coordinate(raw: Option<&Value>, field: &str) -> Result<f64, WeatherError> {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| WeatherError::format(format!("{} missing or not numeric: {:?}", field, raw)))
}

fn provider_id(raw: Option<Value>) -> Option<String> {
    match raw? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl RawPlace {
    fn into_item(self) -> Result<LocationSearchItem, WeatherError> {
        let lat = coordinate(self.latitude.as_ref(), "latitude")?;
        let lon = coordinate(self.longitude.as_ref(), "longitude")?;

        Ok(LocationSearchItem {
            id: provider_id(self.id),
            location: Location {
                name: self.name.unwrap_or_default(),
                country: self.country,
                state: non_empty(self.admin1).or_else(|| non_empty(self.admin2)),
                coordinates: Coordinates::new(lat, lon),
            },
        })
    }
}

/// All matches of a search response. A missing or null `results` array is an empty list.
pub fn parse_search_results(body: &Value) -> Result<Vec<LocationSearchItem>, WeatherError> {
    let raw: RawPlaces = parse_body(body, "geocoding")?;
    raw.results.into_iter().map(RawPlace::into_item).collect()
}

/// Best match of a reverse geocoding response, `None` when nothing matched.
pub fn parse_reverse_result(body: &Value) -> Result<Option<LocationSearchItem>, WeatherError> {
    let raw: RawPlaces = parse_body(body, "reverse geocoding")?;
    raw.results.into_iter().next().map(RawPlace::into_item).transpose()
}

/// The `current_weather` section of a forecast response.
pub fn parse_current_weather(body: &Value) -> Result<CurrentWeather, WeatherError> {
    let cw: RawCurrentWeather = parse_section(body, "current_weather")?
        .ok_or_else(|| WeatherError::format("current_weather section missing"))?;
    let temperature_c = cw
        .temperature
        .ok_or_else(|| WeatherError::format("current_weather.temperature missing"))?;

    let code = parse_code(cw.weathercode)?;
    let (condition_text, condition_icon) = classify(code).into_parts();

    Ok(CurrentWeather {
        temperature_c,
        // Open-Meteo reports km/h unless another unit is requested
        wind_speed_kph: cw.windspeed,
        wind_direction_deg: cw.winddirection,
        weather_code: code,
        condition_text,
        condition_icon,
        observation_time_iso: cw.time,
    })
}

/// Daily and hourly series of a forecast response.
///
/// The two sections are parsed independently. Each series is as long as
/// its shortest array; item `i` is built from index `i` of every array.
pub fn parse_forecast(body: &Value) -> Result<ForecastSeries, WeatherError> {
    let daily_raw: RawDaily = parse_section(body, "daily")?.unwrap_or_default();
    let hourly_raw: RawHourly = parse_section(body, "hourly")?.unwrap_or_default();

    let daily = daily_raw
        .time
        .into_iter()
        .zip(daily_raw.temperature_2m_max)
        .zip(daily_raw.temperature_2m_min)
        .zip(daily_raw.weathercode)
        .map(|(((date, max_temp_c), min_temp_c), code)| {
            let weather_code = parse_code(code)?;
            let (condition_text, condition_icon) = classify(weather_code).into_parts();
            Ok(DailyForecastItem {
                date,
                min_temp_c,
                max_temp_c,
                weather_code,
                condition_text,
                condition_icon,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    let hourly = hourly_raw
        .time
        .into_iter()
        .zip(hourly_raw.temperature_2m)
        .zip(hourly_raw.weathercode)
        .map(|((time_iso, temp_c), code)| {
            let weather_code = parse_code(code)?;
            let (condition_text, condition_icon) = classify(weather_code).into_parts();
            Ok(HourlyForecastItem {
                time_iso,
                temp_c,
                weather_code,
                condition_text,
                condition_icon,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(ForecastSeries { daily, hourly })
}
