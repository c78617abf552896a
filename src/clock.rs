use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};

/// Interactive mode redraws once per second, aligned to the wall clock.
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 1000;

/// The discrete calendar fields one frame of the face is laid out from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFields {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day_of_month: u32,
    pub weekday: Weekday,
    pub timestamp_ms: i64,
}

impl ClockFields {
    /// Panics on out-of-range fields; those are caller bugs, not input.
    pub fn new(hour: u32, minute: u32, second: u32, day_of_month: u32, weekday: Weekday) -> Self {
        assert!(hour < 24, "hour of day out of range: {hour}");
        assert!(minute < 60, "minute out of range: {minute}");
        assert!(second < 60, "second out of range: {second}");
        assert!(
            (1..=31).contains(&day_of_month),
            "day of month out of range: {day_of_month}"
        );
        Self {
            hour,
            minute,
            second,
            day_of_month,
            weekday,
            timestamp_ms: 0,
        }
    }

    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            // leap seconds are reported as second 59
            second: time.second().min(59),
            day_of_month: time.day(),
            weekday: time.weekday(),
            timestamp_ms: time.timestamp_millis(),
        }
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn am_pm(&self) -> &'static str {
        if self.hour >= 12 {
            "PM"
        } else {
            "AM"
        }
    }

    pub fn coarse(&self) -> CoarseFields {
        CoarseFields {
            hour: self.hour,
            weekday: self.weekday,
            day_of_month: self.day_of_month,
        }
    }
}

/// The fields whose change invalidates cached layout. Minutes and seconds
/// are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoarseFields {
    pub hour: u32,
    pub weekday: Weekday,
    pub day_of_month: u32,
}

/// Delay until the next whole second of wall-clock time.
pub fn next_tick_delay_ms(now_ms: i64) -> i64 {
    INTERACTIVE_UPDATE_RATE_MS - now_ms.rem_euclid(INTERACTIVE_UPDATE_RATE_MS)
}
