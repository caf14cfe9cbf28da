use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};

/// Decides which calendar day an instant belongs to, and what the local
/// wall clock reads at that instant.
///
/// The two are deliberately separate: the dashboard historically sliced
/// days on the UTC date while picking the "midday" sample by the viewer's
/// local clock. [`Calendar::utc`] keeps both on UTC so results do not
/// depend on the machine the code runs on.
pub trait DayCalendar {
    /// Calendar date used as the grouping key.
    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate;

    /// The instant on the local wall clock, for hour checks and display.
    fn clock_time(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset>;

    /// Local hour of day, 0-23.
    fn clock_hour(&self, instant: DateTime<Utc>) -> u32 {
        self.clock_time(instant).hour()
    }
}

/// A calendar built from two fixed UTC offsets: one for day boundaries
/// and one for the wall clock.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct Calendar {
    pub day_offset: FixedOffset,
    pub clock_offset: FixedOffset,
}

impl Calendar {
    /// Days and clock both on UTC.
    pub fn utc() -> Calendar {
        Calendar::fixed(utc_offset())
    }

    /// Days and clock both in `offset`.
    pub fn fixed(offset: FixedOffset) -> Calendar {
        Calendar {
            day_offset: offset,
            clock_offset: offset,
        }
    }

    /// UTC day boundaries with a local wall clock.
    pub fn utc_days(clock_offset: FixedOffset) -> Calendar {
        Calendar {
            day_offset: utc_offset(),
            clock_offset,
        }
    }

    /// Offset from a seconds-east-of-UTC value, as the provider reports a
    /// city's timezone. Returns `None` outside ±24 hours.
    pub fn offset_from_seconds(seconds: i32) -> Option<FixedOffset> {
        FixedOffset::east_opt(seconds)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Calendar::utc()
    }
}

impl DayCalendar for Calendar {
    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.day_offset).date_naive()
    }

    fn clock_time(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.clock_offset)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
