//! The fixed feature schema accepted by the risk model.
//!
//! Column order is part of the model contract:
//!
//! | # | Column                   | Source                                  |
//! |---|--------------------------|-----------------------------------------|
//! | 0 | `latitude`               | edge start node / scored point          |
//! | 1 | `longitude`              | edge start node / scored point          |
//! | 2 | `hour`                   | request `TimeContext`                   |
//! | 3 | `day_of_week`            | request `TimeContext`                   |
//! | 4 | `crime_category_code`    | placeholder constant                    |
//! | 5 | `location_category_code` | placeholder constant                    |
//! | 6 | `arrest_flag`            | placeholder constant                    |
//! | 7 | `domestic_flag`          | placeholder constant                    |
//!
//! Columns 4–7 are not derived from live incident data.  Risk therefore
//! varies only with location and time until the model contract changes.

use crate::{GeoPoint, TimeContext};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 8;

/// Column names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "latitude",
    "longitude",
    "hour",
    "day_of_week",
    "crime_category_code",
    "location_category_code",
    "arrest_flag",
    "domestic_flag",
];

/// Crime-category code sent for every row (street assault/battery bucket).
pub const PLACEHOLDER_CRIME_CATEGORY: u16 = 1;
/// Location-category code sent for every row ("street").
pub const PLACEHOLDER_LOCATION_CATEGORY: u16 = 1;

/// One model input row.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureRow {
    pub latitude:               f64,
    pub longitude:              f64,
    pub hour:                   u8,
    pub day_of_week:            u8,
    pub crime_category_code:    u16,
    pub location_category_code: u16,
    pub arrest_flag:            bool,
    pub domestic_flag:          bool,
}

impl FeatureRow {
    /// Row for `point` at `time` with the placeholder categorical columns.
    pub fn placeholder(point: GeoPoint, time: TimeContext) -> Self {
        Self {
            latitude:               point.lat,
            longitude:              point.lon,
            hour:                   time.hour,
            day_of_week:            time.day_of_week,
            crime_category_code:    PLACEHOLDER_CRIME_CATEGORY,
            location_category_code: PLACEHOLDER_LOCATION_CATEGORY,
            arrest_flag:            false,
            domestic_flag:          false,
        }
    }

    /// Overwrite the time columns in place.
    #[inline]
    pub fn set_time(&mut self, time: TimeContext) {
        self.hour = time.hour;
        self.day_of_week = time.day_of_week;
    }

    /// Numeric vector in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.latitude,
            self.longitude,
            f64::from(self.hour),
            f64::from(self.day_of_week),
            f64::from(self.crime_category_code),
            f64::from(self.location_category_code),
            f64::from(u8::from(self.arrest_flag)),
            f64::from(u8::from(self.domestic_flag)),
        ]
    }
}
