//! Local wall-clock readings and the derived clock-face values pushed to the
//! rendering layer every tick.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EntryId;

/// First hour (inclusive) that counts as daytime.
const DAY_START_HOUR: u8 = 6;

/// First hour (inclusive) that counts as night again.
const DAY_END_HOUR: u8 = 18;

/// A local time of day at one-second resolution.
///
/// Constructed only through [`LocalTime::new`], so the fields always lie in
/// `[0,23] x [0,59] x [0,59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocalTime {
    hour24: u8,
    minute: u8,
    second: u8,
}

impl LocalTime {
    /// Build a time of day, or `None` if any component is out of range.
    pub const fn new(hour24: u8, minute: u8, second: u8) -> Option<Self> {
        if hour24 > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            hour24,
            minute,
            second,
        })
    }

    /// Hour on the 24-hour clock.
    pub const fn hour24(self) -> u8 {
        self.hour24
    }

    /// Minute of the hour.
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Second of the minute.
    pub const fn second(self) -> u8 {
        self.second
    }

    /// Hour on the 12-hour clock (midnight and noon are 12).
    pub const fn hour12(self) -> u8 {
        match self.hour24 % 12 {
            0 => 12,
            h => h,
        }
    }

    /// AM before noon, PM from noon on.
    pub const fn period(self) -> Period {
        if self.hour24 < 12 {
            Period::Am
        } else {
            Period::Pm
        }
    }

    /// Day between 06:00 and 17:59, night otherwise.
    pub const fn day_phase(self) -> DayPhase {
        if self.hour24 >= DAY_START_HOUR && self.hour24 < DAY_END_HOUR {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }

    /// Zero-padded `HH:MM:SS` on the 12-hour clock.
    pub fn digital_string(self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.hour12(),
            self.minute,
            self.second
        )
    }

    /// Second hand rotation: 6 degrees per second.
    pub fn second_angle_deg(self) -> f64 {
        f64::from(self.second) * 6.0
    }

    /// Minute hand rotation, advancing smoothly with the seconds.
    pub fn minute_angle_deg(self) -> f64 {
        f64::from(self.minute).mul_add(6.0, f64::from(self.second) * 0.1)
    }

    /// Hour hand rotation, advancing smoothly with the minutes. Always in
    /// `[0, 360)`.
    pub fn hour_angle_deg(self) -> f64 {
        f64::from(self.hour24 % 12).mul_add(30.0, f64::from(self.minute) * 0.5)
    }
}

/// Weekday names, Monday first.
const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Month names, January first.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A local calendar date with its weekday.
///
/// Constructed only through [`LocalDate::new`]; `weekday` counts from
/// Monday (`0`) to Sunday (`6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocalDate {
    year: i32,
    month: u8,
    day: u8,
    weekday: u8,
}

impl LocalDate {
    /// Build a date, or `None` if the month, day or weekday is out of range.
    pub const fn new(year: i32, month: u8, day: u8, weekday: u8) -> Option<Self> {
        if !matches!(month, 1..=12) || !matches!(day, 1..=31) || weekday > 6 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            weekday,
        })
    }

    /// Calendar year.
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month, `1` for January.
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Day of the month.
    pub const fn day(self) -> u8 {
        self.day
    }

    /// Days since Monday.
    pub const fn weekday(self) -> u8 {
        self.weekday
    }

    /// English weekday name.
    pub fn weekday_name(self) -> &'static str {
        WEEKDAY_NAMES
            .get(usize::from(self.weekday))
            .copied()
            .unwrap_or_default()
    }

    /// English month name.
    pub fn month_name(self) -> &'static str {
        MONTH_NAMES
            .get(usize::from(self.month.saturating_sub(1)))
            .copied()
            .unwrap_or_default()
    }

    /// `Monday, July 15, 2024`.
    pub fn formatted(self) -> String {
        format!(
            "{}, {} {}, {}",
            self.weekday_name(),
            self.month_name(),
            self.day,
            self.year
        )
    }
}

/// Half of the 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Period {
    /// Before noon.
    #[serde(rename = "AM")]
    Am,
    /// Noon and after.
    #[serde(rename = "PM")]
    Pm,
}

impl Period {
    /// The label shown next to the digital time.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse day/night classification used for card styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DayPhase {
    /// 06:00 to 17:59.
    Day,
    /// 18:00 to 05:59.
    Night,
}

/// Everything the rendering layer needs to draw one clock card for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ClockFace {
    /// The entry this face belongs to.
    pub entry_id: EntryId,
    /// Hour hand rotation in degrees.
    pub hour_angle_deg: f64,
    /// Minute hand rotation in degrees.
    pub minute_angle_deg: f64,
    /// Second hand rotation in degrees.
    pub second_angle_deg: f64,
    /// `HH:MM:SS` on the 12-hour clock.
    pub digital_string: String,
    /// AM/PM label.
    pub period_label: Period,
    /// Day or night at the entry's location.
    pub day_phase: DayPhase,
    /// UTC offset at the displayed instant, e.g. `GMT+5:30`.
    pub utc_offset_label: String,
    /// Local calendar date at the entry's location.
    pub date: LocalDate,
    /// The date as display text, e.g. `Monday, July 15, 2024`.
    pub formatted_date: String,
}

impl ClockFace {
    /// Derive the face for `entry_id` from a local date and time reading.
    pub fn new(
        entry_id: EntryId,
        date: LocalDate,
        time: LocalTime,
        utc_offset_label: String,
    ) -> Self {
        Self {
            entry_id,
            hour_angle_deg: time.hour_angle_deg(),
            minute_angle_deg: time.minute_angle_deg(),
            second_angle_deg: time.second_angle_deg(),
            digital_string: time.digital_string(),
            period_label: time.period(),
            day_phase: time.day_phase(),
            utc_offset_label,
            formatted_date: date.formatted(),
            date,
        }
    }
}
