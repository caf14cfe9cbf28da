//! The `days` and `hourly` commands over a saved forecast payload.

use crate::output::{render_days, render_hourly_csv, OutputFormat};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use wx_data::day_aggregation::{aggregate_days, find_bucket, summary_days, DayBucket};
use wx_data::interpolation::{interpolate_hourly, HourlyPoint, InterpolationConfig, SpacingMode};
use wx_data::windows::{rain_windows, window_spans, RainWindow, WindowSpan};
use wx_owm::calendar::{Calendar, DayCalendar};
use wx_owm::payload::ForecastResponse;
use wx_owm::sample::Sample;
use wx_utils::dates::{format_day_key, format_hh_mm, parse_day_key};

/// A parsed payload plus the calendar its views should use.
#[derive(Debug, Clone)]
pub struct LoadedForecast {
    pub city: Option<String>,
    pub samples: Vec<Sample>,
    pub calendar: Calendar,
}

/// The wall clock is the city's, when the payload reports a timezone.
/// Days split on UTC midnight unless `local_days` is set.
pub fn calendar_for(response: &ForecastResponse, local_days: bool) -> Calendar {
    match response.city_offset() {
        Some(offset) if local_days => Calendar::fixed(offset),
        Some(offset) => Calendar::utc_days(offset),
        None => {
            if local_days {
                warn!("Forecast has no city timezone; using UTC days");
            }
            Calendar::utc()
        }
    }
}

pub fn parse_forecast(body: &str, local_days: bool) -> anyhow::Result<LoadedForecast> {
    let response = ForecastResponse::from_json(body)?;
    Ok(LoadedForecast {
        city: response.city_name().map(str::to_string),
        samples: response.samples(),
        calendar: calendar_for(&response, local_days),
    })
}

pub fn load_forecast(path: &str, local_days: bool) -> anyhow::Result<LoadedForecast> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read forecast {}: {}", path, e))?;
    parse_forecast(&body, local_days)
}

/// Everything the detail view shows for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyReport {
    pub date: NaiveDate,
    pub points: Vec<HourlyPoint>,
    pub rain_windows: Vec<RainWindow>,
    pub rain_spans: Vec<WindowSpan>,
}

/// Expand the bucket for `date` (or the first bucket) into an hourly report.
pub fn build_hourly_report(
    buckets: &[DayBucket],
    date: Option<NaiveDate>,
    calendar: &Calendar,
    config: &InterpolationConfig,
) -> anyhow::Result<HourlyReport> {
    let bucket = match date {
        Some(date) => find_bucket(buckets, date).ok_or_else(|| {
            anyhow::anyhow!("The forecast has no data for {}", format_day_key(&date))
        })?,
        None => buckets
            .first()
            .ok_or_else(|| anyhow::anyhow!("The forecast has no samples"))?,
    };
    let points = interpolate_hourly(&bucket.samples, calendar, config);
    let windows = rain_windows(&points);
    let spans = window_spans(&points, &windows);
    Ok(HourlyReport {
        date: bucket.date,
        points,
        rain_windows: windows,
        rain_spans: spans,
    })
}

/// One "Rain expected from HH:MM to HH:MM" line per window, in the
/// calendar's wall clock.
pub fn rain_report_lines<C: DayCalendar>(report: &HourlyReport, calendar: &C) -> Vec<String> {
    report
        .rain_spans
        .iter()
        .map(|span| {
            format!(
                "Rain expected from {} to {}",
                format_hh_mm(&calendar.clock_time(span.start)),
                format_hh_mm(&calendar.clock_time(span.end))
            )
        })
        .collect()
}

/// Load `input` and render its first `days` day summaries.
pub fn days_output(
    input: &str,
    days: usize,
    local_days: bool,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let forecast = load_forecast(input, local_days)?;
    let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
    info!(
        "{} samples over {} days for {}",
        forecast.samples.len(),
        buckets.len(),
        forecast.city.as_deref().unwrap_or("unknown city")
    );
    render_days(summary_days(&buckets, days), format)
}

pub fn run_days(
    input: &str,
    days: usize,
    local_days: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    println!("{}", days_output(input, days, local_days, format)?);
    Ok(())
}

/// The rendered hourly series plus the human-readable rain report.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyOutput {
    pub rendered: String,
    pub rain_lines: Vec<String>,
}

/// Load `input` and render the hourly series for `date` (or the first day).
pub fn hourly_output(
    input: &str,
    date: Option<&str>,
    local_days: bool,
    elapsed_time: bool,
    format: OutputFormat,
) -> anyhow::Result<HourlyOutput> {
    let date = date.map(parse_day_key).transpose()?;
    let forecast = load_forecast(input, local_days)?;
    let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
    let config = InterpolationConfig {
        mode: if elapsed_time {
            SpacingMode::ElapsedTime
        } else {
            SpacingMode::SampleFraction
        },
        ..InterpolationConfig::default()
    };
    let report = build_hourly_report(&buckets, date, &forecast.calendar, &config)?;
    info!(
        "{}: {} hourly points, {} rain windows covering {} of them",
        format_day_key(&report.date),
        report.points.len(),
        report.rain_windows.len(),
        report
            .rain_windows
            .iter()
            .map(|w| w.point_count())
            .sum::<usize>()
    );

    let mut rain_lines = rain_report_lines(&report, &forecast.calendar);
    if rain_lines.is_empty() {
        rain_lines.push(format!("No rain expected on {}", format_day_key(&report.date)));
    }
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => render_hourly_csv(&report.points)?,
    };
    Ok(HourlyOutput {
        rendered,
        rain_lines,
    })
}

/// Prints the series on stdout and the rain report on stderr, so the
/// report shows whatever the log level.
pub fn run_hourly(
    input: &str,
    date: Option<&str>,
    local_days: bool,
    elapsed_time: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output = hourly_output(input, date, local_days, elapsed_time, format)?;
    for line in &output.rain_lines {
        eprintln!("{}", line);
    }
    println!("{}", output.rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};
    use wx_data::windows::Window;

    // Two days of a Pune forecast (UTC+5:30), 3-hourly, rain on the afternoon of the 1st.
    const FORECAST_BODY: &str = r#"{
  "cod": "200",
  "list": [
    {"dt": 1714543200, "main": {"temp": 24.0, "temp_min": 23.1, "temp_max": 24.0, "humidity": 40}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}], "wind": {"speed": 2.0}, "pop": 0},
    {"dt": 1714554000, "main": {"temp": 30.0, "temp_min": 29.4, "temp_max": 30.2, "humidity": 30}, "weather": [{"main": "Clouds", "description": "few clouds", "icon": "02d"}], "wind": {"speed": 3.0}, "pop": 0.2},
    {"dt": 1714564800, "main": {"temp": 33.0, "temp_min": 32.6, "temp_max": 33.4, "humidity": 35}, "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}], "wind": {"speed": 4.5}, "pop": 0.8, "rain": {"3h": 1.5}},
    {"dt": 1714575600, "main": {"temp": 27.0, "temp_min": 26.2, "temp_max": 27.1, "humidity": 60}, "weather": [{"main": "Clouds", "description": "overcast clouds", "icon": "04n"}], "wind": {"speed": 3.5}, "pop": 0.4},
    {"dt": 1714586400, "main": {"temp": 25.0, "temp_min": 24.8, "temp_max": 25.0, "humidity": 65}, "weather": [{"main": "Clouds", "description": "overcast clouds", "icon": "04n"}], "wind": {"speed": 3.0}, "pop": 0.1},
    {"dt": 1714597200, "main": {"temp": 23.0, "temp_min": 22.4, "temp_max": 23.0, "humidity": 70}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01n"}], "wind": {"speed": 2.5}, "pop": 0},
    {"dt": 1714608000, "main": {"temp": 22.0, "temp_min": 21.7, "temp_max": 22.0, "humidity": 72}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01n"}], "wind": {"speed": 2.0}, "pop": 0},
    {"dt": 1714618800, "main": {"temp": 21.0, "temp_min": 20.9, "temp_max": 21.0, "humidity": 75}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01n"}], "wind": {"speed": 1.5}, "pop": 0},
    {"dt": 1714629600, "main": {"temp": 25.0, "temp_min": 24.6, "temp_max": 25.3, "humidity": 50}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}], "wind": {"speed": 2.5}, "pop": 0}
  ],
  "city": {"name": "Pune", "country": "IN", "timezone": 19800}
}"#;

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_parse_forecast_uses_city_clock() {
        let forecast = parse_forecast(FORECAST_BODY, false).unwrap();
        assert_eq!(forecast.city.as_deref(), Some("Pune"));
        assert_eq!(forecast.samples.len(), 9);
        assert_eq!(forecast.calendar.day_offset.local_minus_utc(), 0);
        assert_eq!(forecast.calendar.clock_offset.local_minus_utc(), 19_800);

        let local = parse_forecast(FORECAST_BODY, true).unwrap();
        assert_eq!(local.calendar.day_offset.local_minus_utc(), 19_800);
    }

    #[test]
    fn test_calendar_without_timezone() {
        let response = ForecastResponse::from_json(r#"{"cod":"200","list":[]}"#).unwrap();
        assert_eq!(calendar_for(&response, true), Calendar::utc());
        assert_eq!(calendar_for(&response, false), Calendar::utc());
    }

    #[test]
    fn test_days_split_on_utc() {
        // 06:00 UTC on May 1st through 06:00 UTC on May 2nd
        let forecast = parse_forecast(FORECAST_BODY, false).unwrap();
        let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
        let dates: Vec<NaiveDate> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![may(1), may(2)]);
        assert_eq!(buckets[0].samples.len(), 6);
        assert_eq!(buckets[0].max_temp, Some(33));
        assert_eq!(buckets[0].min_temp, Some(22));
        assert!(buckets[0].will_rain);
        assert!(!buckets[1].will_rain);
        // 06:00 UTC reads 11:30 in Pune
        assert_eq!(buckets[0].representative.icon(), Some("01d"));
    }

    #[test]
    fn test_hourly_report_for_first_day() {
        let forecast = parse_forecast(FORECAST_BODY, false).unwrap();
        let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
        let report = build_hourly_report(
            &buckets,
            None,
            &forecast.calendar,
            &InterpolationConfig::default(),
        )
        .unwrap();
        assert_eq!(report.date, may(1));
        assert_eq!(report.points.len(), 15);
        // rain 0 -> 1.5 -> 0 around the 12:00 UTC sample
        assert_eq!(report.rain_windows, vec![Window { start: 4, end: 8 }]);
        assert_eq!(report.rain_spans.len(), 1);
        assert_eq!(
            rain_report_lines(&report, &forecast.calendar),
            vec!["Rain expected from 15:30 to 19:30".to_string()]
        );
    }

    #[test]
    fn test_hourly_report_for_selected_day() {
        let forecast = parse_forecast(FORECAST_BODY, false).unwrap();
        let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
        let report = build_hourly_report(
            &buckets,
            Some(may(2)),
            &forecast.calendar,
            &InterpolationConfig::default(),
        )
        .unwrap();
        assert_eq!(report.points.len(), 6);
        assert!(report.rain_windows.is_empty());
        assert!(rain_report_lines(&report, &forecast.calendar).is_empty());
    }

    #[test]
    fn test_hourly_report_for_missing_day() {
        let forecast = parse_forecast(FORECAST_BODY, false).unwrap();
        let buckets = aggregate_days(&forecast.samples, &forecast.calendar);
        let err = build_hourly_report(
            &buckets,
            Some(may(20)),
            &forecast.calendar,
            &InterpolationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "The forecast has no data for 2024-05-20");

        assert!(build_hourly_report(
            &[],
            None,
            &forecast.calendar,
            &InterpolationConfig::default()
        )
        .is_err());
    }

    #[test]
    fn test_load_forecast_missing_file() {
        assert!(load_forecast("does/not/exist.json", false).is_err());
    }

    fn saved_forecast() -> (TempDir, String) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pune.json");
        std::fs::write(&path, FORECAST_BODY).unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn test_days_output_truncates() {
        let (_dir, path) = saved_forecast();

        let json = days_output(&path, 1, false, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["date"], "2024-05-01");

        let csv = days_output(&path, 6, false, OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().nth(2).unwrap().starts_with("2024-05-02,"));

        assert!(run_days(&path, 6, true, OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_hourly_output_formats() {
        let (_dir, path) = saved_forecast();

        let output = hourly_output(&path, None, false, false, OutputFormat::Json).unwrap();
        assert_eq!(
            output.rain_lines,
            vec!["Rain expected from 15:30 to 19:30".to_string()]
        );
        let value: serde_json::Value = serde_json::from_str(&output.rendered).unwrap();
        assert_eq!(value["date"], "2024-05-01");
        assert_eq!(value["points"].as_array().map(Vec::len), Some(15));

        let csv = hourly_output(&path, Some("2024-05-02"), false, false, OutputFormat::Csv).unwrap();
        // header plus 6 points
        assert_eq!(csv.rendered.lines().count(), 7);
        assert_eq!(csv.rain_lines, vec!["No rain expected on 2024-05-02".to_string()]);

        assert!(run_hourly(&path, None, false, true, OutputFormat::Csv).is_ok());
    }

    #[test]
    fn test_hourly_output_bad_date() {
        let (_dir, path) = saved_forecast();
        assert!(hourly_output(&path, Some("May 2nd"), false, false, OutputFormat::Json).is_err());
        assert!(hourly_output(&path, Some("2024-06-01"), false, false, OutputFormat::Json).is_err());
    }
}
