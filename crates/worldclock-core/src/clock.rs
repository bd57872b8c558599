//! Wall-clock time source and per-zone local time resolution.
//!
//! The current instant comes from a [`Clock`]; [`TimeSource`] shifts it by
//! the global preview offset and resolves it in an IANA zone through the
//! `chrono-tz` database. Daylight-saving and historical offset changes are
//! handled by the database, never by arithmetic here.
//!
//! # Design Principles
//!
//! - Offset arithmetic is checked; an instant outside chrono's range is an
//!   error for that entry, not a panic.
//! - Zone lookups fail per call, so one bad entry cannot stop a tick.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Datelike, Offset, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use worldclock_types::{LocalDate, LocalTime};

/// Errors that can occur while resolving a local time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// The zone name is not in the IANA database.
    #[error("unknown timezone: {zone}")]
    UnknownZone {
        /// The unresolvable zone name.
        zone: String,
    },

    /// The offset moves the instant outside the representable range.
    #[error("offset of {offset_hours}h is out of range")]
    OutOfRange {
        /// The offending offset.
        offset_hours: i32,
    },
}

/// Source of the current instant.
pub trait Clock {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The host's real-time clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock. Clones share the same instant, so a test can
/// keep a handle while the app owns another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    /// Create a clock frozen at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Rc::new(Cell::new(instant)),
        }
    }

    /// Move the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.instant.set(instant);
    }

    /// Move the clock forward by `delta`. Saturates at chrono's range.
    pub fn advance(&self, delta: TimeDelta) {
        let current = self.instant.get();
        self.instant
            .set(current.checked_add_signed(delta).unwrap_or(current));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant.get()
    }
}

/// A local date and time plus the zone's UTC offset at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneReading {
    /// Local calendar date.
    pub date: LocalDate,
    /// Local wall-clock time.
    pub time: LocalTime,
    /// Seconds east of UTC in effect at the instant.
    pub utc_offset_secs: i32,
}

impl ZoneReading {
    /// `GMT+9`, `GMT-5`, `GMT+5:30` style label.
    pub fn utc_offset_label(&self) -> String {
        utc_offset_label(self.utc_offset_secs)
    }
}

/// Computes the current local time in named zones.
pub struct TimeSource {
    clock: Box<dyn Clock>,
}

impl core::fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimeSource").finish_non_exhaustive()
    }
}

impl TimeSource {
    /// Create a time source reading instants from `clock`.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The current instant, unshifted.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The current instant in milliseconds since the Unix epoch.
    pub fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Local time in `zone_name` after shifting now by `offset_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownZone`] if the zone does not resolve, or
    /// [`TimeError::OutOfRange`] if the shifted instant is unrepresentable.
    pub fn current_local_time(
        &self,
        zone_name: &str,
        offset_hours: i32,
    ) -> Result<LocalTime, TimeError> {
        Ok(self.reading(zone_name, offset_hours)?.time)
    }

    /// Like [`current_local_time`](Self::current_local_time), also reporting
    /// the zone's UTC offset at the shifted instant.
    ///
    /// # Errors
    ///
    /// See [`current_local_time`](Self::current_local_time).
    pub fn reading(&self, zone_name: &str, offset_hours: i32) -> Result<ZoneReading, TimeError> {
        let tz = resolve_zone(zone_name)?;
        let shifted = shift_instant(self.clock.now(), offset_hours)?;
        local_reading(shifted, tz, offset_hours)
    }
}

/// Look up an IANA zone by name.
///
/// # Errors
///
/// Returns [`TimeError::UnknownZone`] if the name is not in the database.
pub fn resolve_zone(zone_name: &str) -> Result<Tz, TimeError> {
    zone_name
        .trim()
        .parse::<Tz>()
        .map_err(|_err| TimeError::UnknownZone {
            zone: zone_name.to_owned(),
        })
}

/// Whether `zone_name` resolves in the IANA database.
pub fn is_known_zone(zone_name: &str) -> bool {
    resolve_zone(zone_name).is_ok()
}

/// Every zone name in the database, for zone pickers.
pub fn available_zones() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect()
}

/// Format seconds east of UTC as `GMT+H` or `GMT+H:MM`.
pub fn utc_offset_label(offset_secs: i32) -> String {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    let hours = abs / 3600;
    let minutes = (abs % 3600) / 60;
    if minutes == 0 {
        format!("GMT{sign}{hours}")
    } else {
        format!("GMT{sign}{hours}:{minutes:02}")
    }
}

fn shift_instant(now: DateTime<Utc>, offset_hours: i32) -> Result<DateTime<Utc>, TimeError> {
    TimeDelta::try_hours(i64::from(offset_hours))
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(TimeError::OutOfRange { offset_hours })
}

fn local_reading(
    instant: DateTime<Utc>,
    tz: Tz,
    offset_hours: i32,
) -> Result<ZoneReading, TimeError> {
    let out_of_range = |_err| TimeError::OutOfRange { offset_hours };
    let local = instant.with_timezone(&tz);

    let time = LocalTime::new(
        u8::try_from(local.hour()).map_err(out_of_range)?,
        u8::try_from(local.minute()).map_err(out_of_range)?,
        u8::try_from(local.second()).map_err(out_of_range)?,
    )
    .ok_or(TimeError::OutOfRange { offset_hours })?;

    let date = LocalDate::new(
        local.year(),
        u8::try_from(local.month()).map_err(out_of_range)?,
        u8::try_from(local.day()).map_err(out_of_range)?,
        u8::try_from(local.weekday().num_days_from_monday()).map_err(out_of_range)?,
    )
    .ok_or(TimeError::OutOfRange { offset_hours })?;

    Ok(ZoneReading {
        date,
        time,
        utc_offset_secs: local.offset().fix().local_minus_utc(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    /// Build a time source frozen at the given UTC wall time.
    fn source_at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> TimeSource {
        let instant = Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap();
        TimeSource::new(Box::new(FixedClock::new(instant)))
    }

    fn hms(time: LocalTime) -> (u8, u8, u8) {
        (time.hour24(), time.minute(), time.second())
    }

    #[test]
    fn tokyo_is_nine_hours_ahead() {
        let source = source_at(2024, 3, 1, 12, 34, 56);
        let time = source.current_local_time("Asia/Tokyo", 0).unwrap();
        assert_eq!(hms(time), (21, 34, 56));
    }

    #[test]
    fn new_york_observes_daylight_saving() {
        let winter = source_at(2024, 1, 15, 12, 0, 0);
        let reading = winter.reading("America/New_York", 0).unwrap();
        assert_eq!(reading.time.hour24(), 7);
        assert_eq!(reading.utc_offset_label(), "GMT-5");

        let summer = source_at(2024, 7, 15, 12, 0, 0);
        let reading = summer.reading("America/New_York", 0).unwrap();
        assert_eq!(reading.time.hour24(), 8);
        assert_eq!(reading.utc_offset_label(), "GMT-4");
    }

    #[test]
    fn offset_crossing_spring_forward() {
        // 2024-03-10 06:30 UTC is 01:30 EST; one hour later DST has started
        // and local time jumps to 03:30 EDT.
        let source = source_at(2024, 3, 10, 6, 30, 0);
        assert_eq!(
            source.current_local_time("America/New_York", 0).unwrap().hour24(),
            1
        );
        assert_eq!(
            source.current_local_time("America/New_York", 1).unwrap().hour24(),
            3
        );
    }

    #[test]
    fn offset_shifts_before_conversion() {
        let source = source_at(2024, 3, 1, 23, 15, 0);
        let time = source.current_local_time("Europe/London", 2).unwrap();
        assert_eq!(hms(time), (1, 15, 0));
        let time = source.current_local_time("Europe/London", -24).unwrap();
        assert_eq!(hms(time), (23, 15, 0));
    }

    #[test]
    fn half_hour_zone_label() {
        let source = source_at(2024, 3, 1, 0, 0, 0);
        let reading = source.reading("Asia/Kolkata", 0).unwrap();
        assert_eq!(reading.utc_offset_label(), "GMT+5:30");
        assert_eq!(hms(reading.time), (5, 30, 0));
    }

    #[test]
    fn unknown_zone_is_reported() {
        let source = source_at(2024, 3, 1, 0, 0, 0);
        let err = source.current_local_time("Mars/Olympus_Mons", 0).unwrap_err();
        assert_eq!(
            err,
            TimeError::UnknownZone {
                zone: "Mars/Olympus_Mons".to_owned()
            }
        );
    }

    #[test]
    fn offset_past_the_last_instant_is_out_of_range() {
        let source = TimeSource::new(Box::new(FixedClock::new(DateTime::<Utc>::MAX_UTC)));
        let err = source.current_local_time("UTC", 1).unwrap_err();
        assert_eq!(err, TimeError::OutOfRange { offset_hours: 1 });
        assert!(source.current_local_time("UTC", 0).is_ok());
    }

    #[test]
    fn date_follows_the_zone_across_midnight() {
        // 2024-07-15 (Monday) 20:00 UTC is already Tuesday in Tokyo.
        let source = source_at(2024, 7, 15, 20, 0, 0);
        let tokyo = source.reading("Asia/Tokyo", 0).unwrap();
        assert_eq!(tokyo.date.formatted(), "Tuesday, July 16, 2024");
        let lima = source.reading("America/Lima", 0).unwrap();
        assert_eq!(lima.date.formatted(), "Monday, July 15, 2024");
        let rewound = source.reading("Asia/Tokyo", -12).unwrap();
        assert_eq!((rewound.date.day(), rewound.date.weekday()), (15, 0));
    }

    #[test]
    fn readings_stay_in_range_for_every_zone_and_offset() {
        let source = source_at(2024, 11, 3, 5, 59, 59);
        for zone in available_zones() {
            for offset in [-26, -1, 0, 1, 13] {
                let time = source.current_local_time(zone, offset).unwrap();
                assert!(time.hour24() <= 23, "{zone} {offset}");
                assert!(time.minute() <= 59, "{zone} {offset}");
                assert!(time.second() <= 59, "{zone} {offset}");
            }
        }
    }

    #[test]
    fn offset_labels() {
        assert_eq!(utc_offset_label(0), "GMT+0");
        assert_eq!(utc_offset_label(32_400), "GMT+9");
        assert_eq!(utc_offset_label(-34_200), "GMT-9:30");
        assert_eq!(utc_offset_label(20_700), "GMT+5:45");
    }

    #[test]
    fn fixed_clock_handles_share_the_instant() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let source = TimeSource::new(Box::new(clock.clone()));
        clock.advance(TimeDelta::seconds(90));
        let time = source.current_local_time("UTC", 0).unwrap();
        assert_eq!(hms(time), (0, 1, 30));
        assert_eq!(source.now_ms(), 1_704_067_290_000);
    }

    #[test]
    fn zone_lookup_trims_whitespace() {
        assert!(is_known_zone(" Europe/Paris "));
        assert!(!is_known_zone(""));
    }
}
