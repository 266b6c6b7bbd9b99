use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::ProviderError,
    model::{CurrentConditions, DailySeries, HourlySeries, Location, WeatherSnapshot},
    units::{UnitPreference, build_query_units},
};

use super::WeatherProvider;

pub const GEOCODING_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("weather-now/", env!("CARGO_PKG_VERSION"));
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,precipitation,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,is_day";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    geocoding_url: Url,
    forecast_url: Url,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProviderBuilder {
    geocoding_url: String,
    forecast_url: String,
    timeout: Duration,
}

impl Default for OpenMeteoProviderBuilder {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_ENDPOINT.to_string(),
            forecast_url: FORECAST_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenMeteoProviderBuilder {
    pub fn geocoding_url(mut self, url: impl Into<String>) -> Self {
        self.geocoding_url = url.into();
        self
    }

    pub fn forecast_url(mut self, url: impl Into<String>) -> Self {
        self.forecast_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<OpenMeteoProvider> {
        let geocoding_url = Url::parse(&self.geocoding_url)
            .with_context(|| format!("Invalid geocoding endpoint '{}'", self.geocoding_url))?;
        let forecast_url = Url::parse(&self.forecast_url)
            .with_context(|| format!("Invalid forecast endpoint '{}'", self.forecast_url))?;

        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(OpenMeteoProvider {
            http,
            geocoding_url,
            forecast_url,
        })
    }
}

impl OpenMeteoProvider {
    pub fn builder() -> OpenMeteoProviderBuilder {
        OpenMeteoProviderBuilder::default()
    }
}

#[derive(Debug, Serialize)]
struct GeocodeQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current: &'a str,
    hourly: &'a str,
    daily: &'a str,
    temperature_unit: &'a str,
    wind_speed_unit: &'a str,
    precipitation_unit: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    current: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: Option<String>,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    is_day: u8,
    precipitation: f64,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    is_day: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn search_locations(
        &self,
        query: &str,
        count: u8,
    ) -> Result<Vec<Location>, ProviderError> {
        let params = GeocodeQuery {
            name: query,
            count,
            language: "en",
            format: "json",
        };

        tracing::debug!(query, count, "searching locations");
        let body = execute_request(self.http.get(self.geocoding_url.clone()).query(&params)).await?;
        parse_geocode_response(&body)
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        units: &UnitPreference,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let units = build_query_units(units);
        let params = ForecastQuery {
            latitude: location.latitude,
            longitude: location.longitude,
            current: CURRENT_FIELDS,
            hourly: HOURLY_FIELDS,
            daily: DAILY_FIELDS,
            temperature_unit: units.temperature_unit,
            wind_speed_unit: units.wind_speed_unit,
            precipitation_unit: units.precipitation_unit,
            timezone: "auto",
        };

        tracing::debug!(
            location = %location.display_name(),
            lat = location.latitude,
            lon = location.longitude,
            "fetching forecast"
        );
        let body = execute_request(self.http.get(self.forecast_url.clone()).query(&params)).await?;
        parse_forecast_response(&body)
    }
}

async fn execute_request(request: RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = extract_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(ProviderError::Http {
        status: status.as_u16(),
        message,
    })
}

fn parse_geocode_response(body: &str) -> Result<Vec<Location>, ProviderError> {
    let payload: GeocodeResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("geocode payload: {error}")))?;

    Ok(payload
        .results
        .into_iter()
        .filter(|result| !result.name.trim().is_empty())
        .map(|result| Location {
            name: result.name,
            country: result.country.filter(|country| !country.trim().is_empty()),
            latitude: result.latitude,
            longitude: result.longitude,
        })
        .collect())
}

fn parse_forecast_response(body: &str) -> Result<WeatherSnapshot, ProviderError> {
    let payload: ForecastResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("forecast payload: {error}")))?;

    let current = CurrentConditions {
        time: payload
            .current
            .time
            .as_deref()
            .map(parse_hour)
            .transpose()?,
        temperature: payload.current.temperature_2m,
        humidity: payload.current.relative_humidity_2m,
        apparent_temperature: payload.current.apparent_temperature,
        wind_speed: payload.current.wind_speed_10m,
        precipitation: payload.current.precipitation,
        weather_code: payload.current.weather_code,
        is_day: payload.current.is_day != 0,
    };

    let hourly = HourlySeries {
        times: payload
            .hourly
            .time
            .iter()
            .map(|time| parse_hour(time))
            .collect::<Result<_, _>>()?,
        temperatures: payload.hourly.temperature_2m,
        weather_codes: payload.hourly.weather_code,
        is_day: payload.hourly.is_day.into_iter().map(|flag| flag != 0).collect(),
    };

    let daily = DailySeries {
        dates: payload
            .daily
            .time
            .iter()
            .map(|date| parse_date(date))
            .collect::<Result<_, _>>()?,
        weather_codes: payload.daily.weather_code,
        temp_max: payload.daily.temperature_2m_max,
        temp_min: payload.daily.temperature_2m_min,
    };

    if hourly.len() != hourly.times.len() || daily.len() != daily.dates.len() {
        tracing::warn!(
            hourly = hourly.len(),
            daily = daily.len(),
            "forecast payload has parallel arrays of unequal length"
        );
    }

    Ok(WeatherSnapshot {
        timezone: payload.timezone,
        utc_offset_seconds: payload.utc_offset_seconds,
        current,
        hourly,
        daily,
    })
}

fn parse_hour(raw: &str) -> Result<NaiveDateTime, ProviderError> {
    NaiveDateTime::parse_from_str(raw.trim(), HOUR_FORMAT)
        .map_err(|error| ProviderError::InvalidResponse(format!("time '{raw}': {error}")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| ProviderError::InvalidResponse(format!("date '{raw}': {error}")))
}

fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|json| {
        ["reason", "message", "error"].into_iter().find_map(|key| {
            json.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(str::to_string)
        })
    });

    from_json.or_else(|| Some(truncate_body(trimmed)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
