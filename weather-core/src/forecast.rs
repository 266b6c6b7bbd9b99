//! Day descriptors and hourly windows over a [`WeatherSnapshot`].
//!
//! The hourly series is assumed to start at local midnight of day 0 and to
//! hold one 24-entry block per forecast day. Every function here clamps
//! against short or malformed arrays instead of indexing out of bounds.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::model::WeatherSnapshot;
use crate::weather_code::{self, WeatherInfo};

pub const HOURS_PER_DAY: usize = 24;
pub const FORECAST_DAYS: usize = 7;
/// Maximum number of hourly entries shown at once.
pub const HOURLY_DISPLAY_CAP: usize = 8;

pub const TODAY: &str = "Today";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDescriptor {
    pub date: NaiveDate,
    /// "Today" or the long weekday name.
    pub name: String,
    pub short_name: String,
    pub is_today: bool,
    pub start_index: usize,
    pub end_index: usize,
}

pub fn compute_daily_descriptors(dates: &[NaiveDate], today: NaiveDate) -> Vec<DayDescriptor> {
    dates
        .iter()
        .take(FORECAST_DAYS)
        .enumerate()
        .map(|(i, date)| {
            let is_today = date.day() == today.day() && date.month() == today.month();
            let name = if is_today {
                TODAY.to_string()
            } else {
                date.format("%A").to_string()
            };
            let start_index = i * HOURS_PER_DAY;

            DayDescriptor {
                date: *date,
                name,
                short_name: date.format("%a").to_string(),
                is_today,
                start_index,
                end_index: start_index + HOURS_PER_DAY,
            }
        })
        .collect()
}

/// Half-open `[start, end)` range into the hourly arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyWindow {
    pub start: usize,
    pub end: usize,
}

impl HourlyWindow {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Window of hours to show for `day_index`.
///
/// For "Today" the window skips the hours already past. The window holds at
/// most [`HOURLY_DISPLAY_CAP`] hours and never spills into the next day.
pub fn select_hourly_window(
    day_index: usize,
    descriptors: &[DayDescriptor],
    now_hour: u32,
) -> HourlyWindow {
    let Some(day) = descriptors.get(day_index) else {
        return HourlyWindow::EMPTY;
    };

    let mut start = day.start_index;
    if day.is_today {
        start = start.saturating_add(now_hour as usize);
    }
    let end = start.saturating_add(HOURLY_DISPLAY_CAP).min(day.end_index);

    if start >= end {
        return HourlyWindow::EMPTY;
    }
    HourlyWindow { start, end }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Meridiem {
    AM,
    PM,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Meridiem::AM => f.write_str("AM"),
            Meridiem::PM => f.write_str("PM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourLabel {
    pub display_hour: u32,
    pub meridiem: Meridiem,
}

impl std::fmt::Display for HourLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.display_hour, self.meridiem)
    }
}

/// 12-hour clock label for a 24-hour `hour`. Values past 23 wrap.
pub fn format_hour_label(hour: u32) -> HourLabel {
    let hour = hour % 24;
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour >= 12 { Meridiem::PM } else { Meridiem::AM };

    HourLabel {
        display_hour,
        meridiem,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub label: HourLabel,
    pub temperature: f64,
    pub weather: WeatherInfo,
}

/// Entries of `window`, clamped to the shortest hourly array.
pub fn hourly_entries(snapshot: &WeatherSnapshot, window: HourlyWindow) -> Vec<HourlyEntry> {
    let hourly = &snapshot.hourly;
    let end = window.end.min(hourly.len());
    if window.start >= end {
        return Vec::new();
    }

    (window.start..end)
        .map(|i| {
            let time = hourly.times[i];
            HourlyEntry {
                time,
                label: format_hour_label(time.hour()),
                temperature: hourly.temperatures[i],
                weather: weather_code::resolve(hourly.weather_codes[i], hourly.is_day[i]),
            }
        })
        .collect()
}
