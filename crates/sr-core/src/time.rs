//! Time context used as model input.
//!
//! The risk model only sees the hour of day and the day of week, so that is
//! all the engine carries.  Day numbering follows ISO order starting at 0:
//! Monday = 0 … Sunday = 6.

use std::fmt;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

use crate::{CoreError, CoreResult};

/// Hour-of-day and day-of-week pair fed to the risk model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeContext {
    /// 0..=23
    pub hour: u8,
    /// 0..=6, Monday = 0
    pub day_of_week: u8,
}

impl TimeContext {
    /// Validated constructor.
    pub fn new(hour: u8, day_of_week: u8) -> CoreResult<Self> {
        if hour > 23 || day_of_week > 6 {
            return Err(CoreError::InvalidTimeContext { hour, day_of_week });
        }
        Ok(Self { hour, day_of_week })
    }

    /// Context for the current local wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            hour:        dt.hour() as u8,
            day_of_week: dt.weekday().num_days_from_monday() as u8,
        }
    }

    /// Fill whichever of `hour` / `day_of_week` the caller left out from
    /// `fallback`, then validate.
    pub fn resolve_with(
        hour: Option<u8>,
        day_of_week: Option<u8>,
        fallback: TimeContext,
    ) -> CoreResult<Self> {
        Self::new(
            hour.unwrap_or(fallback.hour),
            day_of_week.unwrap_or(fallback.day_of_week),
        )
    }

    /// [`resolve_with`](Self::resolve_with) against the wall clock.
    pub fn resolve(hour: Option<u8>, day_of_week: Option<u8>) -> CoreResult<Self> {
        Self::resolve_with(hour, day_of_week, Self::now())
    }
}

impl fmt::Display for TimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        let day = DAYS.get(self.day_of_week as usize).copied().unwrap_or("???");
        write!(f, "{day} {:02}:00", self.hour)
    }
}
