use crate::{
    Config, Location, UnitPreference, WeatherSnapshot, error::ProviderError,
    provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Candidate places for a free-text query, best match first.
    /// An empty vector means nothing matched.
    async fn search_locations(
        &self,
        query: &str,
        count: u8,
    ) -> Result<Vec<Location>, ProviderError>;

    async fn fetch_forecast(
        &self,
        location: &Location,
        units: &UnitPreference,
    ) -> Result<WeatherSnapshot, ProviderError>;
}

/// Construct the Open-Meteo provider from config endpoints and timeout.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::builder()
        .geocoding_url(&config.geocoding_url)
        .forecast_url(&config.forecast_url)
        .timeout(config.timeout())
        .build()?;

    Ok(Arc::new(provider))
}
