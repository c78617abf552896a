use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Weekday;
use serde::Serialize;

use crate::measure::{TextMeasurer, TextStyle};

/// Rendered size of one discrete field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsItem {
    pub text: String,
    pub width: i32,
    pub height: i32,
}

impl MetricsItem {
    fn measure(measurer: &dyn TextMeasurer, style: &TextStyle, text: String) -> Self {
        let size = measurer.measure(style, &text);
        Self {
            text,
            width: size.width,
            height: size.height,
        }
    }

    pub fn is_single_digit(&self) -> bool {
        self.text.chars().count() <= 1
    }
}

/// Styles of the measured fields, fixed for the lifetime of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStyles {
    pub hours: TextStyle,
    pub single_digit_hours: TextStyle,
    pub minutes: TextStyle,
    pub seconds: TextStyle,
    pub date: TextStyle,
}

impl FieldStyles {
    pub fn for_hours(&self, text: &str) -> &TextStyle {
        if text.chars().count() <= 1 {
            &self.single_digit_hours
        } else {
            &self.hours
        }
    }
}

pub fn format_hours(hour_of_day: u32, is24h: bool) -> String {
    assert!(hour_of_day < 24, "hour of day out of range: {hour_of_day}");
    let shown = match (is24h, hour_of_day) {
        (true, hour) => hour,
        (false, 0) => 12,
        (false, hour) if hour > 12 => hour - 12,
        (false, hour) => hour,
    };
    shown.to_string()
}

pub fn format_two_digits(value: u32) -> String {
    format!("{value:02}")
}

pub fn format_date(day_of_month: u32, weekday: Weekday) -> String {
    format!("{weekday} {day_of_month}")
}

/// Sizes of every string a clock field can show, measured once per distinct
/// string so that laying out a frame never measures text.
///
/// Hours are kept in both 12 h and 24 h form. Dates depend on two calendar
/// fields and most combinations never occur, so they are measured on first
/// use and memoized per (day of month, weekday).
pub struct MetricsCache {
    measurer: Rc<dyn TextMeasurer>,
    date_style: TextStyle,
    hours_24: Vec<MetricsItem>,
    hours_12: Vec<MetricsItem>,
    minutes: Vec<MetricsItem>,
    seconds: Vec<MetricsItem>,
    dates: RefCell<HashMap<u32, HashMap<Weekday, MetricsItem>>>,
}

impl MetricsCache {
    pub fn build(measurer: Rc<dyn TextMeasurer>, styles: &FieldStyles) -> Self {
        let mut measured_hours: HashMap<String, MetricsItem> = HashMap::new();
        let mut hour_item = |text: String| {
            measured_hours
                .entry(text.clone())
                .or_insert_with(|| {
                    MetricsItem::measure(measurer.as_ref(), styles.for_hours(&text), text)
                })
                .clone()
        };
        let hours_24 = (0..24)
            .map(|hour| hour_item(format_hours(hour, true)))
            .collect::<Vec<_>>();
        let hours_12 = (0..24)
            .map(|hour| hour_item(format_hours(hour, false)))
            .collect::<Vec<_>>();

        let minutes = (0..60)
            .map(|m| MetricsItem::measure(measurer.as_ref(), &styles.minutes, format_two_digits(m)))
            .collect();
        let seconds = (0..60)
            .map(|s| MetricsItem::measure(measurer.as_ref(), &styles.seconds, format_two_digits(s)))
            .collect();

        tracing::debug!(
            hours_size = styles.hours.size,
            minutes_size = styles.minutes.size,
            seconds_size = styles.seconds.size,
            "built metrics cache"
        );

        Self {
            measurer,
            date_style: styles.date,
            hours_24,
            hours_12,
            minutes,
            seconds,
            dates: RefCell::new(HashMap::new()),
        }
    }

    pub fn hours(&self, hour_of_day: u32, is24h: bool) -> &MetricsItem {
        let table = if is24h { &self.hours_24 } else { &self.hours_12 };
        &table[checked(hour_of_day, 24, "hour of day")]
    }

    pub fn minutes(&self, minute: u32) -> &MetricsItem {
        &self.minutes[checked(minute, 60, "minute")]
    }

    pub fn seconds(&self, second: u32) -> &MetricsItem {
        &self.seconds[checked(second, 60, "second")]
    }

    pub fn date(&self, day_of_month: u32, weekday: Weekday) -> MetricsItem {
        assert!(
            (1..=31).contains(&day_of_month),
            "day of month out of range: {day_of_month}"
        );
        let mut dates = self.dates.borrow_mut();
        dates
            .entry(day_of_month)
            .or_default()
            .entry(weekday)
            .or_insert_with(|| {
                MetricsItem::measure(
                    self.measurer.as_ref(),
                    &self.date_style,
                    format_date(day_of_month, weekday),
                )
            })
            .clone()
    }

    /// Number of memoized date strings.
    pub fn cached_dates(&self) -> usize {
        self.dates.borrow().values().map(HashMap::len).sum()
    }

    pub fn max_hours_height(&self, is24h: bool) -> i32 {
        let table = if is24h { &self.hours_24 } else { &self.hours_12 };
        max_height(table)
    }

    pub fn max_minutes_height(&self) -> i32 {
        max_height(&self.minutes)
    }
}

fn max_height(items: &[MetricsItem]) -> i32 {
    items.iter().map(|item| item.height).max().unwrap_or(0)
}

fn checked(value: u32, limit: u32, field: &str) -> usize {
    assert!(value < limit, "{field} out of range: {value}");
    value as usize
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::{format_date, format_hours, format_two_digits};

    #[test]
    fn twelve_hour_boundaries() {
        assert_eq!(format_hours(0, false), "12");
        assert_eq!(format_hours(12, false), "12");
        assert_eq!(format_hours(13, false), "1");
        assert_eq!(format_hours(23, false), "11");
        assert_eq!(format_hours(0, true), "0");
        assert_eq!(format_hours(23, true), "23");
    }

    #[test]
    fn minutes_and_seconds_are_zero_padded() {
        assert_eq!(format_two_digits(0), "00");
        assert_eq!(format_two_digits(7), "07");
        assert_eq!(format_two_digits(59), "59");
    }

    #[test]
    fn date_uses_short_weekday_then_day() {
        assert_eq!(format_date(3, Weekday::Tue), "Tue 3");
        assert_eq!(format_date(31, Weekday::Sun), "Sun 31");
    }

    #[test]
    #[should_panic(expected = "hour of day out of range")]
    fn hour_24_is_rejected() {
        format_hours(24, true);
    }
}
