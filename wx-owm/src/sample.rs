use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nominal spacing between provider samples, in hours.
pub const NOMINAL_SPACING_HOURS: i64 = 3;

/// Display tokens describing the weather at a sample.
///
/// `group` is the provider's coarse category ("Rain", "Clouds"),
/// `description` the human text ("light rain") and `icon` the provider's
/// icon code ("10d"). None of them are interpreted beyond the rain check.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub group: String,
    pub description: String,
    pub icon: String,
}

/// One raw forecast reading from the provider.
///
/// Every measured field is optional: the provider omits `rain` entirely
/// when no rain is forecast and occasionally drops other fields. Use
/// [`Sample::readings`] to get the values with the neutral defaults applied.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub temp: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// Relative humidity, percent.
    pub humidity: Option<u8>,
    /// Wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Probability of precipitation, 0.0 to 1.0.
    pub pop: Option<f64>,
    /// Rain volume over the preceding 3 hours, mm.
    pub rain_3h: Option<f64>,
    pub condition: Option<Condition>,
}

/// The numeric fields of a [`Sample`] with missing values replaced by 0.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Readings {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Probability of precipitation scaled to percent.
    pub pop_pct: f64,
    pub rain: f64,
}

impl Readings {
    /// Linear blend of two readings; `fraction` 0.0 yields `self`, 1.0 yields `other`.
    pub fn lerp(&self, other: &Readings, fraction: f64) -> Readings {
        let blend = |a: f64, b: f64| a + (b - a) * fraction;
        Readings {
            temp: blend(self.temp, other.temp),
            humidity: blend(self.humidity, other.humidity),
            wind_speed: blend(self.wind_speed, other.wind_speed),
            pop_pct: blend(self.pop_pct, other.pop_pct),
            rain: blend(self.rain, other.rain),
        }
    }
}

impl Sample {
    /// A sample with only a timestamp; every reading is absent.
    pub fn bare(timestamp: i64) -> Sample {
        Sample {
            timestamp,
            temp: None,
            temp_min: None,
            temp_max: None,
            humidity: None,
            wind_speed: None,
            pop: None,
            rain_3h: None,
            condition: None,
        }
    }

    /// The sample's instant. Timestamps chrono cannot represent fall back
    /// to the epoch rather than failing.
    pub fn instant(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp, 0).unwrap_or_default()
    }

    pub fn readings(&self) -> Readings {
        Readings {
            temp: self.temp.unwrap_or(0.0),
            humidity: self.humidity.map(f64::from).unwrap_or(0.0),
            wind_speed: self.wind_speed.unwrap_or(0.0),
            pop_pct: self.pop.unwrap_or(0.0) * 100.0,
            rain: self.rain_3h.unwrap_or(0.0),
        }
    }

    /// True if the condition group mentions rain ("Rain", "Freezing rain").
    pub fn indicates_rain(&self) -> bool {
        self.condition
            .as_ref()
            .map(|c| c.group.to_lowercase().contains("rain"))
            .unwrap_or(false)
    }

    pub fn icon(&self) -> Option<&str> {
        self.condition.as_ref().map(|c| c.icon.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.condition.as_ref().map(|c| c.description.as_str())
    }
}
