use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::{
    error::ProviderError,
    model::{CurrentConditions, DailySeries, HourlySeries, Location, WeatherSnapshot},
    provider::WeatherProvider,
    units::UnitPreference,
};

/// Monday 2025-03-10, 00:00 local.
pub fn first_hour() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid time")
}

/// Seven days of data starting [`first_hour`], UTC+1.
pub fn sample_snapshot(temperature: f64) -> WeatherSnapshot {
    let times: Vec<NaiveDateTime> = (0..168)
        .map(|h| first_hour() + chrono::Duration::hours(h))
        .collect();
    let dates: Vec<NaiveDate> = first_hour().date().iter_days().take(7).collect();

    WeatherSnapshot {
        timezone: Some("Europe/Berlin".to_string()),
        utc_offset_seconds: 3600,
        current: CurrentConditions {
            time: Some(first_hour()),
            temperature,
            humidity: 64.0,
            apparent_temperature: temperature - 2.4,
            wind_speed: 12.6,
            precipitation: 0.2,
            weather_code: 2,
            is_day: true,
        },
        hourly: HourlySeries {
            temperatures: (0..168).map(|h| (h % 24) as f64).collect(),
            weather_codes: vec![0; 168],
            is_day: times.iter().map(|t| (7..19).contains(&t.hour())).collect(),
            times,
        },
        daily: DailySeries {
            dates,
            weather_codes: vec![0, 1, 2, 3, 61, 80, 95],
            temp_max: vec![10.6, 11.0, 12.4, 9.5, 8.0, 7.5, 9.9],
            temp_min: vec![1.2, 2.0, 3.5, -0.5, -1.6, 0.0, 2.2],
        },
    }
}

#[derive(Debug, Default)]
pub struct StubProvider {
    locations: Vec<Location>,
    failing_searches: bool,
    failing_forecasts: AtomicUsize,
    searches: Mutex<Vec<String>>,
    forecasts: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    pub fn failing_searches(mut self) -> Self {
        self.failing_searches = true;
        self
    }

    /// Fail the next `count` forecast requests.
    pub fn failing_forecasts(self, count: usize) -> Self {
        self.failing_forecasts.store(count, Ordering::SeqCst);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn forecasts(&self) -> usize {
        self.forecasts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn search_locations(
        &self,
        query: &str,
        _count: u8,
    ) -> Result<Vec<Location>, ProviderError> {
        if let Ok(mut searches) = self.searches.lock() {
            searches.push(query.to_string());
        }
        if self.failing_searches {
            return Err(ProviderError::Transport("connection refused".into()));
        }
        Ok(self.locations.clone())
    }

    async fn fetch_forecast(
        &self,
        _location: &Location,
        _units: &UnitPreference,
    ) -> Result<WeatherSnapshot, ProviderError> {
        self.forecasts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_forecasts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_forecasts.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::Http {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(sample_snapshot(18.0))
    }
}
