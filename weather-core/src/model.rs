use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A selected place. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        country: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            country,
            latitude,
            longitude,
        }
    }

    pub fn berlin() -> Self {
        Self::new("Berlin", Some("Germany".to_string()), 52.52, 13.41)
    }

    /// "Name, Country", or just the name when the country is unknown.
    pub fn display_name(&self) -> String {
        match self.country.as_deref().filter(|c| !c.is_empty()) {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::berlin()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: Option<NaiveDateTime>,
    pub temperature: f64,
    pub humidity: f64,
    pub apparent_temperature: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

/// Parallel hourly arrays; index `i` of every vector is the same hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub times: Vec<NaiveDateTime>,
    pub temperatures: Vec<f64>,
    pub weather_codes: Vec<i32>,
    pub is_day: Vec<bool>,
}

impl HourlySeries {
    /// Number of hours every parallel array can serve.
    pub fn len(&self) -> usize {
        self.times
            .len()
            .min(self.temperatures.len())
            .min(self.weather_codes.len())
            .min(self.is_day.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub weather_codes: Vec<i32>,
    pub temp_max: Vec<f64>,
    pub temp_min: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.dates
            .len()
            .min(self.weather_codes.len())
            .min(self.temp_max.len())
            .min(self.temp_min.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One complete forecast response. Replaced atomically on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub timezone: Option<String>,
    pub utc_offset_seconds: i32,
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

impl WeatherSnapshot {
    /// Wall-clock time at the forecast location.
    ///
    /// The hourly series is aligned to the location's timezone, so the
    /// "Today" window is computed from this rather than the machine clock.
    pub fn local_now(&self, utc_now: DateTime<Utc>) -> NaiveDateTime {
        match FixedOffset::east_opt(self.utc_offset_seconds) {
            Some(offset) => utc_now.with_timezone(&offset).naive_local(),
            None => utc_now.naive_utc(),
        }
    }
}
