//! Shared fixtures for the Open-Meteo mock server tests.

use chrono::{Duration, NaiveDate, Timelike};
use serde_json::{Value, json};
use weather_now_core::OpenMeteoProvider;
use wiremock::MockServer;

pub const GEOCODE_PATH: &str = "/v1/search";
pub const FORECAST_PATH: &str = "/v1/forecast";

pub fn provider_for(server: &MockServer) -> OpenMeteoProvider {
    OpenMeteoProvider::builder()
        .geocoding_url(format!("{}{GEOCODE_PATH}", server.uri()))
        .forecast_url(format!("{}{FORECAST_PATH}", server.uri()))
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap()
}

pub fn berlin_geocode() -> Value {
    json!({
        "results": [
            {
                "id": 2950159,
                "name": "Berlin",
                "latitude": 52.52437,
                "longitude": 13.41053,
                "country": "Germany",
                "timezone": "Europe/Berlin"
            },
            {
                "id": 5083330,
                "name": "Berlin",
                "latitude": 44.46867,
                "longitude": -71.18508,
                "country": "United States",
                "timezone": "America/New_York"
            }
        ],
        "generationtime_ms": 0.9
    })
}

/// Seven days of metric forecast starting 2025-03-10 in Europe/Berlin.
pub fn berlin_forecast() -> Value {
    let start = NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let hours: Vec<_> = (0..168).map(|h| start + Duration::hours(h)).collect();
    let times: Vec<_> = hours
        .iter()
        .map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    let temperatures: Vec<_> = hours
        .iter()
        .map(|t| 2.0 + t.hour() as f64 * 0.5)
        .collect();
    let codes: Vec<_> = hours
        .iter()
        .map(|t| if t.hour() < 12 { 0 } else { 61 })
        .collect();
    let is_day: Vec<_> = hours
        .iter()
        .map(|t| u8::from((7..18).contains(&t.hour())))
        .collect();
    let dates: Vec<_> = (0..7)
        .map(|d| {
            (start.date() + Duration::days(d))
                .format("%Y-%m-%d")
                .to_string()
        })
        .collect();

    json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "timezone": "Europe/Berlin",
        "timezone_abbreviation": "GMT+1",
        "utc_offset_seconds": 3600,
        "current": {
            "time": "2025-03-10T14:15",
            "interval": 900,
            "temperature_2m": 9.6,
            "relative_humidity_2m": 58,
            "apparent_temperature": 6.8,
            "is_day": 1,
            "precipitation": 0.0,
            "weather_code": 3,
            "wind_speed_10m": 15.1
        },
        "hourly": {
            "time": times,
            "temperature_2m": temperatures,
            "weather_code": codes,
            "is_day": is_day
        },
        "daily": {
            "time": dates,
            "weather_code": [3, 61, 80, 0, 1, 45, 95],
            "temperature_2m_max": [10.2, 8.7, 7.9, 12.3, 13.0, 9.1, 11.4],
            "temperature_2m_min": [1.4, 0.8, -1.5, 2.1, 3.3, 4.0, 5.2]
        }
    })
}
