//! Linear interpolation of 3-hourly samples into an hourly series.

use chrono::{DateTime, TimeDelta, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use wx_owm::calendar::DayCalendar;
use wx_owm::sample::{Sample, NOMINAL_SPACING_HOURS};
use wx_utils::dates::format_clock_hour;
use wx_utils::rounding::{round_half_up, round_to_tenth};

/// Where the synthetic points of a segment are placed in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpacingMode {
    /// Points sit `h * nominal_spacing / sub_steps` after the earlier
    /// sample regardless of the real gap to the next one. A segment
    /// spanning a 6 hour hole is squeezed into 3 hours of labels.
    #[default]
    SampleFraction,
    /// Points are spread evenly over the real gap between the two samples,
    /// so every value sits at the instant it was interpolated for.
    ElapsedTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolationConfig {
    pub nominal_spacing: TimeDelta,
    /// Points emitted per segment, the earlier sample included.
    pub sub_steps: u32,
    pub mode: SpacingMode,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        InterpolationConfig {
            nominal_spacing: TimeDelta::hours(NOMINAL_SPACING_HOURS),
            sub_steps: NOMINAL_SPACING_HOURS as u32,
            mode: SpacingMode::SampleFraction,
        }
    }
}

/// One synthetic point of the hourly series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    /// Clock label in the calendar's offset, e.g. "3 pm".
    pub time: String,
    pub time_full: DateTime<Utc>,
    pub temp: i64,
    pub humidity: i64,
    /// m/s, one decimal.
    pub wind: f64,
    /// Probability of precipitation, percent.
    pub precipitation: i64,
    /// Interpolated 3 hour rain volume, mm. Not rounded.
    pub rain_amount: f64,
    pub icon: Option<String>,
    pub desc: Option<String>,
}

/// Seconds between the earlier sample and sub-step `step`.
fn step_offset_secs(curr: &Sample, next: &Sample, step: u32, config: &InterpolationConfig) -> i64 {
    let nominal = config.nominal_spacing.num_seconds();
    let span = match config.mode {
        SpacingMode::SampleFraction => nominal,
        SpacingMode::ElapsedTime => {
            let elapsed = next.timestamp.saturating_sub(curr.timestamp);
            if elapsed > 0 {
                elapsed
            } else {
                nominal
            }
        }
    };
    let offset = i128::from(span) * i128::from(step) / i128::from(config.sub_steps.max(1));
    i64::try_from(offset).unwrap_or(i64::MAX)
}

/// Interpolate the points between two consecutive samples: `sub_steps`
/// points, starting at `curr` and stopping short of `next`.
pub fn interpolate_pair<C: DayCalendar>(
    curr: &Sample,
    next: &Sample,
    calendar: &C,
    config: &InterpolationConfig,
) -> Vec<HourlyPoint> {
    let from = curr.readings();
    let to = next.readings();
    let icon = curr.icon().map(str::to_string);
    let desc = curr.description().map(str::to_string);

    (0..config.sub_steps)
        .map(|step| {
            let fraction = f64::from(step) / f64::from(config.sub_steps);
            let value = from.lerp(&to, fraction);
            let offset = step_offset_secs(curr, next, step, config);
            let time_full = DateTime::from_timestamp(curr.timestamp.saturating_add(offset), 0)
                .unwrap_or_default();
            HourlyPoint {
                time: format_clock_hour(&calendar.clock_time(time_full)),
                time_full,
                temp: round_half_up(value.temp),
                humidity: round_half_up(value.humidity),
                wind: round_to_tenth(value.wind_speed),
                precipitation: round_half_up(value.pop_pct),
                rain_amount: value.rain,
                icon: icon.clone(),
                desc: desc.clone(),
            }
        })
        .collect()
}

/// Expand an ordered sample series into `sub_steps * (n - 1)` points.
///
/// The final sample only serves as the end of the last segment; a series
/// of fewer than two samples yields nothing.
pub fn interpolate_hourly<C: DayCalendar>(
    samples: &[Sample],
    calendar: &C,
    config: &InterpolationConfig,
) -> Vec<HourlyPoint> {
    if config.sub_steps == 0 {
        warn!("interpolation: sub_steps is 0, nothing to emit");
        return Vec::new();
    }
    let mut result = Vec::with_capacity(samples.len().saturating_sub(1) * config.sub_steps as usize);
    for window in samples.windows(2) {
        result.extend(interpolate_pair(&window[0], &window[1], calendar, config));
    }
    result
}
