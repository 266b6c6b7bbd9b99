//! Core library for the Weather Now dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - Unit preferences and the forecast API's unit parameters
//! - WMO weather code lookup and hourly/daily forecast windowing
//! - The weather provider abstraction and its Open-Meteo implementation
//! - Application state, its reducer, and the dashboard view model
//!
//! It is used by `weather-now-cli`, but any frontend can drive [`Dashboard`]
//! and draw the resulting [`Screen`].

pub mod app;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod suggest;
pub mod units;
pub mod view;
pub mod weather_code;

#[cfg(test)]
mod test_support;

pub use app::{AppState, Dashboard, Effect, Event, RequestToken, Status};
pub use config::Config;
pub use error::{DashboardError, ProviderError};
pub use model::{Location, WeatherSnapshot};
pub use provider::{WeatherProvider, open_meteo::OpenMeteoProvider, provider_from_config};
pub use suggest::{SuggestionFeed, Suggestions};
pub use units::{UnitPreference, build_query_units, is_imperial};
pub use view::Screen;
