//! Grouping of a flat sample series into calendar-day buckets.

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use wx_owm::calendar::DayCalendar;
use wx_owm::sample::Sample;
use wx_utils::rounding::round_half_up;

/// Number of days shown in the forecast summary.
pub const DAYS_IN_SUMMARY: usize = 6;

/// Clock hours, inclusive, a sample must fall in to represent its day.
pub const MIDDAY_HOURS: (u32, u32) = (10, 14);

/// All samples of one calendar day plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    /// Serialized as "YYYY-MM-DD".
    pub date: NaiveDate,
    pub samples: Vec<Sample>,
    /// Rounded highest `temp_max`; `None` if no sample reported one.
    pub max_temp: Option<i64>,
    /// Rounded lowest `temp_min`; `None` if no sample reported one.
    pub min_temp: Option<i64>,
    pub will_rain: bool,
    /// The sample whose icon and condition stand for the whole day.
    pub representative: Sample,
}

impl DayBucket {
    /// Build a bucket from a non-empty, ordered list of samples.
    fn from_samples<C: DayCalendar>(
        date: NaiveDate,
        samples: Vec<Sample>,
        calendar: &C,
    ) -> Option<DayBucket> {
        let representative = representative_sample(&samples, calendar)?.clone();
        let max_temp = samples
            .iter()
            .filter_map(|s| s.temp_max)
            .reduce(f64::max)
            .map(round_half_up);
        let min_temp = samples
            .iter()
            .filter_map(|s| s.temp_min)
            .reduce(f64::min)
            .map(round_half_up);
        let will_rain = samples.iter().any(Sample::indicates_rain);
        Some(DayBucket {
            date,
            samples,
            max_temp,
            min_temp,
            will_rain,
            representative,
        })
    }
}

/// The first sample in the midday window, or the middle sample if none is.
pub fn representative_sample<'a, C: DayCalendar>(
    samples: &'a [Sample],
    calendar: &C,
) -> Option<&'a Sample> {
    let (from, to) = MIDDAY_HOURS;
    samples
        .iter()
        .find(|s| (from..=to).contains(&calendar.clock_hour(s.instant())))
        .or_else(|| samples.get(samples.len() / 2))
}

/// Group samples by calendar day, in order of each day's first appearance.
///
/// Nothing is dropped: every input sample lands in exactly one bucket, in
/// its input order.
pub fn aggregate_days<C: DayCalendar>(samples: &[Sample], calendar: &C) -> Vec<DayBucket> {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut groups: HashMap<NaiveDate, Vec<Sample>> = HashMap::new();
    for sample in samples {
        let date = calendar.day_of(sample.instant());
        groups
            .entry(date)
            .or_insert_with(|| {
                order.push(date);
                Vec::new()
            })
            .push(sample.clone());
    }

    let buckets: Vec<DayBucket> = order
        .into_iter()
        .filter_map(|date| {
            let day_samples = groups.remove(&date)?;
            DayBucket::from_samples(date, day_samples, calendar)
        })
        .collect();
    debug!(
        "day_aggregation: {} samples into {} days",
        samples.len(),
        buckets.len()
    );
    buckets
}

/// The first `days` buckets, for the N-day summary view.
pub fn summary_days(buckets: &[DayBucket], days: usize) -> &[DayBucket] {
    &buckets[..buckets.len().min(days)]
}

/// The bucket for `date`, if the series covers it.
pub fn find_bucket(buckets: &[DayBucket], date: NaiveDate) -> Option<&DayBucket> {
    buckets.iter().find(|bucket| bucket.date == date)
}
