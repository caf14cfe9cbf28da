//! JSON and CSV rendering of command results.

use clap::ValueEnum;
use serde::Serialize;
use wx_data::day_aggregation::DayBucket;
use wx_data::interpolation::HourlyPoint;
use wx_utils::dates::{format_day_key, format_day_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Flat per-day row for CSV output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummaryRow {
    pub date: String,
    pub label: String,
    pub max_temp: Option<i64>,
    pub min_temp: Option<i64>,
    pub will_rain: bool,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub samples: usize,
}

impl From<&DayBucket> for DaySummaryRow {
    fn from(bucket: &DayBucket) -> Self {
        DaySummaryRow {
            date: format_day_key(&bucket.date),
            label: format_day_label(&bucket.date),
            max_temp: bucket.max_temp,
            min_temp: bucket.min_temp,
            will_rain: bucket.will_rain,
            icon: bucket.representative.icon().map(str::to_string),
            description: bucket.representative.description().map(str::to_string),
            samples: bucket.samples.len(),
        }
    }
}

/// Serialize `rows` as CSV with a header line.
pub fn to_csv<T: Serialize>(rows: &[T]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render_days(buckets: &[DayBucket], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(buckets)?),
        OutputFormat::Csv => {
            let rows: Vec<DaySummaryRow> = buckets.iter().map(DaySummaryRow::from).collect();
            to_csv(&rows)
        }
    }
}

/// Hourly points as CSV. Rain windows are reported separately.
pub fn render_hourly_csv(points: &[HourlyPoint]) -> anyhow::Result<String> {
    to_csv(points)
}
