use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use weather_now_core::{
    AppState, Config, Dashboard, Event, Status, UnitPreference, provider_from_config,
    units::{PrecipUnit, SpeedUnit, TemperatureUnit},
    view::Body,
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-now", version, about = "Weather Now terminal dashboard")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set default units and default location.
    Configure,

    /// Show the dashboard for a place (or the configured default).
    Show {
        /// Place name; the best geocoding match is used.
        place: Option<String>,

        /// Forecast day for the hourly panel, 0 = today.
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=6))]
        day: u8,

        /// Print the screen as JSON instead of text panels.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        units: UnitArgs,
    },

    /// List places matching a query.
    Search {
        query: String,

        /// Maximum number of candidates.
        #[arg(long)]
        count: Option<u8>,
    },

    /// Run the dashboard with interactive controls.
    Interactive {
        #[command(flatten)]
        units: UnitArgs,
    },
}

/// Unit overrides on top of the configured preference.
#[derive(Debug, Clone, Default, Args)]
pub struct UnitArgs {
    /// Use °F, mph and inches.
    #[arg(long, conflicts_with = "metric")]
    pub imperial: bool,

    /// Use °C, km/h and millimeters.
    #[arg(long)]
    pub metric: bool,

    /// Temperature unit: celsius or fahrenheit.
    #[arg(long)]
    pub temp: Option<String>,

    /// Wind speed unit: kmh or mph.
    #[arg(long)]
    pub speed: Option<String>,

    /// Precipitation unit: mm or inch.
    #[arg(long)]
    pub precip: Option<String>,
}

impl UnitArgs {
    pub fn resolve(&self, configured: UnitPreference) -> UnitPreference {
        let mut units = if self.imperial {
            UnitPreference::IMPERIAL
        } else if self.metric {
            UnitPreference::METRIC
        } else {
            configured
        };

        if let Some(temp) = &self.temp {
            units.temp = TemperatureUnit::from_token(temp);
        }
        if let Some(speed) = &self.speed {
            units.speed = SpeedUnit::from_token(speed);
        }
        if let Some(precip) = &self.precip {
            units.precip = PrecipUnit::from_token(precip);
        }
        units
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        tracing::debug!(?config, "configuration loaded");

        match self.command {
            Command::Configure => interactive::configure(config).await,
            Command::Show {
                place,
                day,
                json,
                units,
            } => show(&config, place, day, json, &units).await,
            Command::Search { query, count } => search(&config, &query, count).await,
            Command::Interactive { units } => {
                let dashboard = build_dashboard(&config, &units)?;
                interactive::run(dashboard, config.suggestion_count).await
            }
        }
    }
}

fn build_dashboard(config: &Config, units: &UnitArgs) -> anyhow::Result<Dashboard> {
    let provider = provider_from_config(config)?;
    let state = AppState::new(units.resolve(config.units), config.default_location.clone());
    Ok(Dashboard::new(provider, state, config.suggestion_count))
}

async fn show(
    config: &Config,
    place: Option<String>,
    day: u8,
    json: bool,
    units: &UnitArgs,
) -> anyhow::Result<()> {
    let mut dashboard = build_dashboard(config, units)?;

    match place {
        Some(query) => dashboard.dispatch(Event::SearchSubmitted(query)).await,
        None => dashboard.start().await,
    };

    loop {
        let retry = match &dashboard.state().status {
            Status::Failed(error) => error.is_retryable() && interactive::confirm_retry(error),
            _ => false,
        };
        if !retry {
            break;
        }
        dashboard.dispatch(Event::RetryRequested).await;
    }

    dashboard.dispatch(Event::DaySelected(day as usize)).await;

    let screen = dashboard.screen(Utc::now());
    if json {
        let text = serde_json::to_string_pretty(&screen).context("Failed to serialize screen")?;
        println!("{text}");
    } else {
        print!("{}", render::screen(&screen));
    }

    if let Body::Failed { detail, .. } = &screen.body {
        bail!("{detail}");
    }
    Ok(())
}

async fn search(config: &Config, query: &str, count: Option<u8>) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let count = count.unwrap_or(config.suggestion_count);

    let locations = provider
        .search_locations(query, count)
        .await
        .with_context(|| format!("Location search for '{query}' failed"))?;

    if locations.is_empty() {
        println!("No search result found!");
        return Ok(());
    }

    for (i, location) in locations.iter().enumerate() {
        println!("{}", render::location_line(i, location));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperial_flag_overrides_config() {
        let args = UnitArgs {
            imperial: true,
            ..UnitArgs::default()
        };
        assert_eq!(args.resolve(UnitPreference::METRIC), UnitPreference::IMPERIAL);
    }

    #[test]
    fn axis_flags_apply_on_top_of_preset() {
        let args = UnitArgs {
            imperial: true,
            precip: Some("mm".into()),
            ..UnitArgs::default()
        };
        let units = args.resolve(UnitPreference::METRIC);
        assert_eq!(units.temp, TemperatureUnit::Fahrenheit);
        assert_eq!(units.precip, PrecipUnit::Millimeter);
    }

    #[test]
    fn unknown_axis_flag_falls_back_to_metric() {
        let args = UnitArgs {
            speed: Some("knots".into()),
            ..UnitArgs::default()
        };
        let units = args.resolve(UnitPreference::IMPERIAL);
        assert_eq!(units.speed, SpeedUnit::KmPerHour);
        assert_eq!(units.temp, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn no_flags_keep_configured_units() {
        assert_eq!(
            UnitArgs::default().resolve(UnitPreference::IMPERIAL),
            UnitPreference::IMPERIAL
        );
    }

    #[test]
    fn parses_show_with_day_and_units() {
        let cli = Cli::try_parse_from(["weather-now", "show", "Berlin", "--day", "3", "--imperial"])
            .expect("valid args");
        match cli.command {
            Command::Show {
                place, day, units, ..
            } => {
                assert_eq!(place.as_deref(), Some("Berlin"));
                assert_eq!(day, 3);
                assert!(units.imperial);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_day_out_of_range() {
        assert!(Cli::try_parse_from(["weather-now", "show", "--day", "7"]).is_err());
    }

    #[test]
    fn rejects_conflicting_presets() {
        assert!(Cli::try_parse_from(["weather-now", "show", "--imperial", "--metric"]).is_err());
    }
}
