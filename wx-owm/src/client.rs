//! Thin async client for the OpenWeatherMap endpoints the dashboard uses.
//!
//! Failures are returned as-is; there is no retry or backoff here.

use crate::current::CurrentResponse;
use crate::payload::{first_coordinates, Coordinates, ForecastResponse, ProviderError};
use log::info;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OwmClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OwmClient {
    pub fn new(api_key: &str) -> Result<OwmClient, ProviderError> {
        OwmClient::with_base_url(api_key, DEFAULT_API_BASE)
    }

    /// Point the client at another host, e.g. a local mock.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<OwmClient, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::HttpRequestError(e.to_string()))?;
        Ok(OwmClient {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn geocode_url(&self) -> String {
        format!("{}/geo/1.0/direct", self.base_url)
    }

    pub fn forecast_url(&self) -> String {
        format!("{}/data/2.5/forecast", self.base_url)
    }

    pub fn current_url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::HttpRequestError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::HttpRequestError(e.to_string()))?;
        check_status(status, &body)?;
        Ok(body)
    }

    /// Resolve a city name to the provider's best match.
    pub async fn geocode(&self, city: &str) -> Result<Coordinates, ProviderError> {
        let body = self
            .get_text(
                &self.geocode_url(),
                &[("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        first_coordinates(&body, city)
    }

    /// Fetch the 5 day / 3 hour forecast in metric units.
    pub async fn forecast(&self, coords: &Coordinates) -> Result<ForecastResponse, ProviderError> {
        let body = self
            .get_text(&self.forecast_url(), &OwmClient::point_query(coords))
            .await?;
        ForecastResponse::from_json(&body)
    }

    fn point_query(coords: &Coordinates) -> [(&'static str, String); 3] {
        [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", "metric".to_string()),
        ]
    }

    /// Fetch the current conditions in metric units.
    pub async fn current(&self, coords: &Coordinates) -> Result<CurrentResponse, ProviderError> {
        let body = self
            .get_text(&self.current_url(), &OwmClient::point_query(coords))
            .await?;
        CurrentResponse::from_json(&body)
    }

    /// Geocode, then fetch the current conditions for the match, named
    /// after the geocoded city.
    pub async fn current_for_city(&self, city: &str) -> Result<CurrentResponse, ProviderError> {
        let coords = self.geocode(city).await?;
        info!(
            "Resolved {:?} to {} ({:.4}, {:.4})",
            city, coords.name, coords.lat, coords.lon
        );
        let mut current = self.current(&coords).await?;
        current.name = Some(coords.name.clone());
        if current.country().is_none() {
            current.sys.get_or_insert_with(Default::default).country = coords.country.clone();
        }
        Ok(current)
    }

    /// Geocode, then fetch the forecast for the match. The response's city
    /// name is replaced with the geocoded one, which is usually the better
    /// spelled of the two.
    pub async fn forecast_for_city(&self, city: &str) -> Result<ForecastResponse, ProviderError> {
        let coords = self.geocode(city).await?;
        info!(
            "Resolved {:?} to {} ({:.4}, {:.4})",
            city, coords.name, coords.lat, coords.lon
        );
        let mut forecast = self.forecast(&coords).await?;
        let city_block = forecast.city.get_or_insert_with(Default::default);
        city_block.name = Some(coords.name.clone());
        if city_block.country.is_none() {
            city_block.country = coords.country.clone();
        }
        Ok(forecast)
    }
}

/// Map a non-success status to an error, preferring the provider's own
/// `cod`/`message` when the body has them.
fn check_status(status: StatusCode, body: &str) -> Result<(), ProviderError> {
    if status.is_success() {
        return Ok(());
    }
    match ForecastResponse::from_json(body) {
        Err(upstream @ ProviderError::Upstream { .. }) => Err(upstream),
        _ => Err(ProviderError::HttpStatus(status.as_u16())),
    }
}
