//! The `current` command: conditions right now for a city.

use crate::fetch::client_for;
use crate::output::{to_csv, OutputFormat};
use log::info;
use serde::Serialize;
use wx_owm::current::CurrentResponse;
use wx_utils::dates::format_hh_mm;
use wx_utils::rounding::{round_half_up, round_to_tenth};

/// What the current-conditions card shows, in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReport {
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// °C, rounded half up.
    pub temp: Option<i64>,
    pub feels_like: Option<i64>,
    pub humidity: Option<u8>,
    /// m/s.
    pub wind_speed: Option<f64>,
    /// hPa.
    pub pressure: Option<f64>,
    pub visibility_km: f64,
    /// HH:MM on the city's clock, or UTC when the body has no timezone.
    pub observed_at: Option<String>,
}

impl From<&CurrentResponse> for CurrentReport {
    fn from(current: &CurrentResponse) -> Self {
        let condition = current.condition();
        let observed_at = current.observed_at().map(|instant| match current.city_offset() {
            Some(offset) => format_hh_mm(&instant.with_timezone(&offset)),
            None => format_hh_mm(&instant),
        });
        CurrentReport {
            city: current.name.clone(),
            country: current.country().map(str::to_string),
            description: condition.as_ref().map(|c| c.description.clone()),
            icon: condition.map(|c| c.icon),
            temp: current.temp().map(round_half_up),
            feels_like: current.feels_like().map(round_half_up),
            humidity: current.humidity(),
            wind_speed: current.wind_speed(),
            pressure: current.pressure(),
            visibility_km: round_to_tenth(current.visibility_m() / 1000.0),
            observed_at,
        }
    }
}

/// "Pune, IN" or just the name when the country is unknown.
pub fn place_label(report: &CurrentReport) -> String {
    let name = report.city.as_deref().unwrap_or("unknown city");
    match report.country.as_deref() {
        Some(country) if !country.is_empty() => format!("{}, {}", name, country),
        _ => name.to_string(),
    }
}

pub fn render_current(report: &CurrentReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => to_csv(std::slice::from_ref(report)),
    }
}

pub fn parse_current(body: &str) -> anyhow::Result<CurrentReport> {
    let current = CurrentResponse::from_json(body)?;
    Ok(CurrentReport::from(&current))
}

pub async fn run_current(
    city: &str,
    api_key: &str,
    api_base: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = client_for(api_key, api_base)?;
    info!("Fetching current conditions for {:?}", city);
    let current = client.current_for_city(city).await?;
    let report = CurrentReport::from(&current);
    info!("Current conditions for {}", place_label(&report));
    println!("{}", render_current(&report, format)?);
    Ok(())
}
