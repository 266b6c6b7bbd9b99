//! Presentation-agnostic view of the dashboard.
//!
//! [`Screen::build`] turns an [`AppState`] into the panels a frontend draws:
//! a header, then either a loading or error placeholder, or the dashboard
//! itself (current block, details grid, daily grid, hourly panel).

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::{
    app::{AppState, Status},
    forecast::{self, DayDescriptor, HOURLY_DISPLAY_CAP, HourLabel, compute_daily_descriptors},
    model::WeatherSnapshot,
    units::{UnitPreference, toggle_label},
    weather_code::{self, WeatherInfo},
};

pub const TITLE: &str = "Weather Now";
pub const NO_MORE_FORECAST: &str = "No more forecast for today";
pub const DETAIL_LABELS: [&str; 4] = ["Feels Like", "Humidity", "Wind", "Precipitation"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub header: Header,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub title: &'static str,
    pub units: UnitPreference,
    pub toggle_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Loading,
    Failed {
        message: &'static str,
        detail: String,
        retryable: bool,
    },
    Dashboard(DashboardView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub current: CurrentBlock,
    pub details: Vec<DetailItem>,
    pub daily: Vec<DailyCard>,
    pub hourly: HourlyPanel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentBlock {
    pub location: String,
    pub date_line: String,
    pub weather: WeatherInfo,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCard {
    pub day: String,
    pub weather: WeatherInfo,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPanel {
    pub selected_day: usize,
    pub selected_name: String,
    /// Names offered by the day picker, in forecast order.
    pub days: Vec<String>,
    pub rows: HourlyRows,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HourlyRows {
    Entries(Vec<HourlyRow>),
    NoMoreForecast,
}

impl HourlyRows {
    pub fn len(&self) -> usize {
        match self {
            Self::Entries(rows) => rows.len(),
            Self::NoMoreForecast => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub label: HourLabel,
    pub weather: WeatherInfo,
    pub temperature: i64,
}

impl Screen {
    pub fn build(state: &AppState, utc_now: DateTime<Utc>) -> Self {
        let header = Header {
            title: TITLE,
            units: state.units,
            toggle_label: toggle_label(&state.units),
        };

        let body = match (&state.status, &state.snapshot) {
            (Status::Failed(error), _) => Body::Failed {
                message: error.user_message(),
                detail: error.to_string(),
                retryable: error.is_retryable(),
            },
            (Status::Ready, Some(snapshot)) => {
                Body::Dashboard(DashboardView::build(state, snapshot, utc_now))
            }
            _ => Body::Loading,
        };

        Self { header, body }
    }
}

impl DashboardView {
    fn build(state: &AppState, snapshot: &WeatherSnapshot, utc_now: DateTime<Utc>) -> Self {
        let local_now = snapshot.local_now(utc_now);
        let units = &state.units;
        let current = &snapshot.current;

        let current_block = CurrentBlock {
            location: state.location.display_name(),
            date_line: local_now.format("%A, %b %-d, %Y").to_string(),
            weather: weather_code::resolve(current.weather_code, current.is_day),
            temperature: round_display(current.temperature),
        };

        let details = vec![
            DetailItem {
                label: DETAIL_LABELS[0],
                value: format!("{}°", round_display(current.apparent_temperature)),
            },
            DetailItem {
                label: DETAIL_LABELS[1],
                value: format!("{}%", round_display(current.humidity)),
            },
            DetailItem {
                label: DETAIL_LABELS[2],
                value: format!("{} {}", round_display(current.wind_speed), units.speed.symbol()),
            },
            DetailItem {
                label: DETAIL_LABELS[3],
                value: format!("{} {}", current.precipitation, units.precip.symbol()),
            },
        ];

        let descriptors = compute_daily_descriptors(&snapshot.daily.dates, local_now.date());

        let daily = descriptors
            .iter()
            .take(snapshot.daily.len())
            .enumerate()
            .map(|(i, day)| DailyCard {
                day: day.short_name.clone(),
                weather: weather_code::resolve(snapshot.daily.weather_codes[i], true),
                max: round_display(snapshot.daily.temp_max[i]),
                min: round_display(snapshot.daily.temp_min[i]),
            })
            .collect();

        let hourly = hourly_panel(snapshot, &descriptors, state.selected_day, local_now.hour());

        Self {
            current: current_block,
            details,
            daily,
            hourly,
        }
    }
}

fn hourly_panel(
    snapshot: &WeatherSnapshot,
    descriptors: &[DayDescriptor],
    selected_day: usize,
    now_hour: u32,
) -> HourlyPanel {
    let window = forecast::select_hourly_window(selected_day, descriptors, now_hour);
    let rows: Vec<HourlyRow> = forecast::hourly_entries(snapshot, window)
        .into_iter()
        .take(HOURLY_DISPLAY_CAP)
        .map(|entry| HourlyRow {
            label: entry.label,
            weather: entry.weather,
            temperature: round_display(entry.temperature),
        })
        .collect();

    HourlyPanel {
        selected_day,
        selected_name: descriptors
            .get(selected_day)
            .map(|day| day.name.clone())
            .unwrap_or_else(|| "-".to_string()),
        days: descriptors.iter().map(|day| day.name.clone()).collect(),
        rows: if rows.is_empty() {
            HourlyRows::NoMoreForecast
        } else {
            HourlyRows::Entries(rows)
        },
    }
}

/// Round half up, the way the temperature readouts are shown.
pub fn round_display(value: f64) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        0
    }
}
