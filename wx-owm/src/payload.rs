//! Serde model of the OpenWeatherMap `/data/2.5/forecast` and
//! `/geo/1.0/direct` response bodies.
//!
//! Every field is parsed leniently: a missing, `null` or wrongly typed
//! value becomes `None` instead of failing the whole body. The forecast
//! `list` is decoded entry by entry, so one bad entry cannot take the
//! forecast down with it.

use crate::sample::{Condition, Sample};
use chrono::FixedOffset;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Errors that can occur when fetching or parsing provider responses.
#[derive(Debug, PartialEq, Clone)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    HttpRequestError(String),
    /// Non-2xx HTTP status.
    HttpStatus(u16),
    /// The body was not the JSON shape we expect.
    ParseError(String),
    /// Geocoding returned no match.
    CityNotFound(String),
    /// The body carried a non-200 `cod`.
    Upstream { code: String, message: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpRequestError(msg) => write!(f, "HTTP request failed: {}", msg),
            ProviderError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            ProviderError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ProviderError::CityNotFound(city) => write!(f, "City not found: {}", city),
            ProviderError::Upstream { code, message } => {
                write!(f, "Provider error {}: {}", code, message)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], but per element: an element that does not decode
/// becomes `None` in place. Anything other than an array is `None`.
fn lenient_each<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Unix seconds, as an integer or a whole-number float (`1714564800.0`).
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_TIMESTAMP)
                .map(|f| f as i64)
        }),
        _ => None,
    })
}

// Far beyond any forecast, well inside the range f64 holds exactly.
const MAX_TIMESTAMP: f64 = 1.0e15;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MainBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temp_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temp_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RainBlock {
    #[serde(rename = "3h", default, deserialize_with = "lenient")]
    pub three_hours: Option<f64>,
}

/// One entry of the forecast `list`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<MainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather: Option<Vec<WeatherBlock>>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind: Option<WindBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub pop: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rain: Option<RainBlock>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct City {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    /// Seconds east of UTC.
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<i32>,
}

/// Body of the `/forecast` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// "200" on success; the provider mixes strings and numbers here.
    #[serde(default)]
    pub cod: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    /// `None` in place of each entry that was not a readable object.
    #[serde(default, deserialize_with = "lenient_each")]
    pub list: Option<Vec<Option<ForecastEntry>>>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<City>,
}

/// A geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `Ok` when `cod` reads as 200, whether the provider sent it as a number
/// or a string. A missing `cod` passes only when `missing_cod_ok` is set.
pub(crate) fn check_cod(
    cod: Option<&serde_json::Value>,
    message: Option<&serde_json::Value>,
    missing_cod_ok: bool,
    fallback_message: &str,
) -> Result<(), ProviderError> {
    let code = match cod {
        None if missing_cod_ok => return Ok(()),
        None => "(none)".to_string(),
        Some(cod) => value_to_string(cod),
    };
    if code == "200" {
        return Ok(());
    }
    let message = message
        .map(value_to_string)
        .unwrap_or_else(|| fallback_message.to_string());
    Err(ProviderError::Upstream { code, message })
}

impl ForecastResponse {
    /// Parse a `/forecast` body and reject provider-level errors.
    pub fn from_json(body: &str) -> Result<ForecastResponse, ProviderError> {
        let response: ForecastResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;
        response.ensure_ok()?;
        Ok(response)
    }

    /// `Ok` unless the body carries a `cod` other than 200.
    pub fn ensure_ok(&self) -> Result<(), ProviderError> {
        check_cod(
            self.cod.as_ref(),
            self.message.as_ref(),
            true,
            "Forecast not available",
        )
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.as_ref().and_then(|c| c.name.as_deref())
    }

    /// The city's UTC offset, if the body reports a valid one.
    pub fn city_offset(&self) -> Option<FixedOffset> {
        self.city
            .as_ref()
            .and_then(|c| c.timezone)
            .and_then(FixedOffset::east_opt)
    }

    /// Convert the entries into samples, keeping provider order.
    ///
    /// Entries that are not objects, or have no timestamp, cannot be placed
    /// in the series and are skipped; everything else degrades field by
    /// field.
    pub fn samples(&self) -> Vec<Sample> {
        let entries = self.list.as_deref().unwrap_or_default();
        let mut skipped = 0usize;
        let samples: Vec<Sample> = entries
            .iter()
            .filter_map(|entry| {
                let sample = entry
                    .as_ref()
                    .and_then(|entry| Sample::try_from(entry).ok());
                if sample.is_none() {
                    skipped += 1;
                }
                sample
            })
            .collect();
        if skipped > 0 {
            warn!(
                "payload: skipped {} of {} forecast entries without a usable timestamp",
                skipped,
                entries.len()
            );
        }
        if samples.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            warn!("payload: forecast timestamps are not strictly increasing");
        }
        debug!("payload: {} samples", samples.len());
        samples
    }
}

/// The entry had no usable timestamp.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MissingTimestamp;

impl TryFrom<&ForecastEntry> for Sample {
    type Error = MissingTimestamp;

    fn try_from(entry: &ForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = entry.dt.ok_or(MissingTimestamp)?;
        let main = entry.main.clone().unwrap_or_default();
        Ok(Sample {
            timestamp,
            temp: main.temp,
            temp_min: main.temp_min,
            temp_max: main.temp_max,
            humidity: humidity_percent(main.humidity),
            wind_speed: entry.wind.as_ref().and_then(|w| w.speed),
            pop: entry.pop,
            rain_3h: entry.rain.as_ref().and_then(|r| r.three_hours),
            condition: first_condition(entry.weather.as_deref()),
        })
    }
}

/// The provider lists conditions most significant first.
pub(crate) fn first_condition(weather: Option<&[WeatherBlock]>) -> Option<Condition> {
    weather
        .and_then(|blocks| blocks.first())
        .map(|block| Condition {
            group: block.main.clone().unwrap_or_default(),
            description: block.description.clone().unwrap_or_default(),
            icon: block.icon.clone().unwrap_or_default(),
        })
}

pub(crate) fn humidity_percent(humidity: Option<f64>) -> Option<u8> {
    humidity
        .filter(|h| h.is_finite())
        .map(|h| h.round().clamp(0.0, 100.0) as u8)
}

/// Pick the first match of a `/geo/1.0/direct` body.
pub fn first_coordinates(body: &str, city: &str) -> Result<Coordinates, ProviderError> {
    let matches: Vec<Coordinates> =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;
    matches
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::CityNotFound(city.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed from a real /forecast?lat=40.69&lon=-89.59&units=metric response
    const FORECAST_BODY: &str = r#"{
  "cod": "200",
  "message": 0,
  "cnt": 3,
  "list": [
    {"dt": 1714564800, "main": {"temp": 18.2, "feels_like": 17.9, "temp_min": 17.4, "temp_max": 18.9, "pressure": 1012, "humidity": 71},
     "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
     "wind": {"speed": 4.12, "deg": 190}, "pop": 0.12, "dt_txt": "2024-05-01 12:00:00"},
    {"dt": 1714575600, "main": {"temp": 19.6, "temp_min": 19.6, "temp_max": 20.3, "humidity": 66},
     "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
     "wind": {"speed": 5.3}, "pop": 0.64, "rain": {"3h": 0.87}, "dt_txt": "2024-05-01 15:00:00"},
    {"dt": 1714586400, "main": {"temp": "warm", "temp_min": 16.1, "temp_max": 17.0, "humidity": 80},
     "weather": [], "wind": null, "pop": 0.3, "rain": {"3h": null}}
  ],
  "city": {"id": 4905687, "name": "Peoria", "country": "US", "timezone": -18000}
}"#;

    #[test]
    fn test_forecast_samples() {
        let response = ForecastResponse::from_json(FORECAST_BODY).unwrap();
        let samples = response.samples();
        assert_eq!(samples.len(), 3);

        assert_eq!(samples[0].timestamp, 1_714_564_800);
        assert_eq!(samples[0].temp_max, Some(18.9));
        assert_eq!(samples[0].humidity, Some(71));
        assert_eq!(samples[0].rain_3h, None);
        assert_eq!(samples[0].icon(), Some("04d"));

        assert_eq!(samples[1].rain_3h, Some(0.87));
        assert!(samples[1].indicates_rain());
        assert_eq!(samples[1].description(), Some("light rain"));
    }

    #[test]
    fn test_malformed_fields_degrade_individually() {
        let response = ForecastResponse::from_json(FORECAST_BODY).unwrap();
        let malformed = &response.samples()[2];
        assert_eq!(malformed.temp, None);
        assert_eq!(malformed.temp_min, Some(16.1));
        assert_eq!(malformed.wind_speed, None);
        assert_eq!(malformed.rain_3h, None);
        assert_eq!(malformed.condition, None);
        assert_eq!(malformed.pop, Some(0.3));
    }

    #[test]
    fn test_entries_without_timestamp_are_skipped() {
        let body = r#"{"cod":"200","list":[{"main":{"temp":10}},{"dt":1714564800}]}"#;
        let samples = ForecastResponse::from_json(body).unwrap().samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0], Sample::bare(1_714_564_800));
    }

    #[test]
    fn test_unreadable_entries_are_skipped_one_by_one() {
        let body = r#"{"cod":"200","list":[
            {"dt":1714564800,"main":{"temp":18.2}},
            {"dt":1714575600},
            "garbage",
            42,
            {"dt":"soon","main":{"temp":3}}
        ]}"#;
        let response = ForecastResponse::from_json(body).unwrap();
        assert_eq!(response.list.as_ref().map(Vec::len), Some(5));

        let samples = response.samples();
        let timestamps: Vec<i64> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![1_714_564_800, 1_714_575_600]);
        assert_eq!(samples[0].temp, Some(18.2));
    }

    #[test]
    fn test_whole_float_timestamps() {
        let body = r#"{"cod":"200","list":[{"dt":1714564800.0},{"dt":1714575600.5},{"dt":1e300}]}"#;
        let samples = ForecastResponse::from_json(body).unwrap().samples();
        assert_eq!(samples, vec![Sample::bare(1_714_564_800)]);
    }

    #[test]
    fn test_list_that_is_not_an_array() {
        for body in [
            r#"{"cod":"200","list":null}"#,
            r#"{"cod":"200","list":"none"}"#,
            r#"{"cod":"200"}"#,
        ] {
            let response = ForecastResponse::from_json(body).unwrap();
            assert_eq!(response.list, None);
            assert!(response.samples().is_empty());
        }
    }

    #[test]
    fn test_city_metadata() {
        let response = ForecastResponse::from_json(FORECAST_BODY).unwrap();
        assert_eq!(response.city_name(), Some("Peoria"));
        assert_eq!(
            response.city_offset().map(|o| o.local_minus_utc()),
            Some(-18_000)
        );
    }

    #[test]
    fn test_upstream_error_body() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        assert_eq!(
            ForecastResponse::from_json(body),
            Err(ProviderError::Upstream {
                code: "404".to_string(),
                message: "city not found".to_string(),
            })
        );

        let numeric = r#"{"cod":401,"message":"Invalid API key"}"#;
        let err = ForecastResponse::from_json(numeric).unwrap_err();
        assert_eq!(err.to_string(), "Provider error 401: Invalid API key");
    }

    #[test]
    fn test_not_json() {
        let result = ForecastResponse::from_json("<html>bad gateway</html>");
        assert!(matches!(result, Err(ProviderError::ParseError(_))));
    }

    #[test]
    fn test_empty_list_is_not_an_error() {
        let response = ForecastResponse::from_json(r#"{"cod":"200","list":[]}"#).unwrap();
        assert!(response.samples().is_empty());
    }

    #[test]
    fn test_first_coordinates() {
        let body = r#"[{"name":"Peoria","lat":40.6936,"lon":-89.589,"country":"US","state":"Illinois"}]"#;
        let coords = first_coordinates(body, "peoria").unwrap();
        assert_eq!(coords.name, "Peoria");
        assert_eq!(coords.country.as_deref(), Some("US"));

        assert_eq!(
            first_coordinates("[]", "Atlantis"),
            Err(ProviderError::CityNotFound("Atlantis".to_string()))
        );
    }
}
