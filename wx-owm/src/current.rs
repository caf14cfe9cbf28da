//! Serde model of the OpenWeatherMap `/data/2.5/weather` body, the
//! current conditions at a point. Parsed with the same per-field leniency
//! as the forecast.

use crate::payload::{
    check_cod, first_condition, humidity_percent, lenient, lenient_timestamp, ProviderError,
    WeatherBlock, WindBlock,
};
use crate::sample::Condition;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Visibility assumed when the body has none, in metres.
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentMain {
    #[serde(default, deserialize_with = "lenient")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    /// hPa.
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentSys {
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

/// Body of the `/weather` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentResponse {
    /// 200 on success; a number here, unlike the forecast's string.
    #[serde(default)]
    pub cod: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub dt: Option<i64>,
    /// Seconds east of UTC.
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<CurrentMain>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather: Option<Vec<WeatherBlock>>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind: Option<WindBlock>,
    /// Metres.
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub sys: Option<CurrentSys>,
}

impl CurrentResponse {
    /// Parse a `/weather` body and reject provider-level errors.
    pub fn from_json(body: &str) -> Result<CurrentResponse, ProviderError> {
        let response: CurrentResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;
        response.ensure_ok()?;
        Ok(response)
    }

    /// Unlike the forecast, a body without any `cod` is not trusted.
    pub fn ensure_ok(&self) -> Result<(), ProviderError> {
        check_cod(
            self.cod.as_ref(),
            self.message.as_ref(),
            false,
            "Weather data not available",
        )
    }

    fn main_block(&self) -> CurrentMain {
        self.main.clone().unwrap_or_default()
    }

    pub fn temp(&self) -> Option<f64> {
        self.main_block().temp
    }

    pub fn feels_like(&self) -> Option<f64> {
        self.main_block().feels_like
    }

    pub fn humidity(&self) -> Option<u8> {
        humidity_percent(self.main_block().humidity)
    }

    pub fn pressure(&self) -> Option<f64> {
        self.main_block().pressure
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.wind.as_ref().and_then(|w| w.speed)
    }

    pub fn condition(&self) -> Option<Condition> {
        first_condition(self.weather.as_deref())
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }

    /// Visibility in metres, [`DEFAULT_VISIBILITY_M`] when absent.
    pub fn visibility_m(&self) -> f64 {
        self.visibility
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_VISIBILITY_M)
    }

    pub fn city_offset(&self) -> Option<FixedOffset> {
        self.timezone.and_then(FixedOffset::east_opt)
    }

    /// When the conditions were observed.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|dt| DateTime::from_timestamp(dt, 0))
    }
}
