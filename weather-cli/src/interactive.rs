//! Prompt-driven controls: the interactive dashboard loop and `configure`.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use inquire::{
    Confirm, CustomUserError, InquireError, Select, Text,
    autocompletion::{Autocomplete, Replacement},
};
use tokio::runtime::Handle;
use weather_now_core::{
    Config, Dashboard, DashboardError, Event, Location, SuggestionFeed, UnitPreference,
    provider_from_config,
    suggest::DEBOUNCE,
    units::{PrecipUnit, SpeedUnit, TemperatureUnit},
    view::{Body, Screen},
};

use crate::render;

/// How long a keystroke waits for its own suggestions.
const SUGGESTION_WAIT: Duration = Duration::from_secs(2);

const TEMPERATURE_OPTIONS: [(TemperatureUnit, &str); 2] = [
    (TemperatureUnit::Celsius, "Celsius (°C)"),
    (TemperatureUnit::Fahrenheit, "Fahrenheit (°F)"),
];
const SPEED_OPTIONS: [(SpeedUnit, &str); 2] = [
    (SpeedUnit::KmPerHour, "km/h"),
    (SpeedUnit::MilesPerHour, "mph"),
];
const PRECIP_OPTIONS: [(PrecipUnit, &str); 2] = [
    (PrecipUnit::Millimeter, "Millimeters (mm)"),
    (PrecipUnit::Inch, "Inches (in)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    ChooseDay,
    ToggleUnits(&'static str),
    Temperature,
    WindSpeed,
    Precipitation,
    Retry,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search for a place"),
            Action::ChooseDay => f.write_str("Choose hourly forecast day"),
            Action::ToggleUnits(label) => f.write_str(label),
            Action::Temperature => f.write_str("Temperature unit"),
            Action::WindSpeed => f.write_str("Wind speed unit"),
            Action::Precipitation => f.write_str("Precipitation unit"),
            Action::Retry => f.write_str("↻ Retry"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions(screen: &Screen) -> Vec<Action> {
    let mut actions = Vec::with_capacity(8);
    if matches!(screen.body, Body::Failed { retryable: true, .. }) {
        actions.push(Action::Retry);
    }
    actions.push(Action::Search);
    if matches!(screen.body, Body::Dashboard(_)) {
        actions.push(Action::ChooseDay);
    }
    actions.extend([
        Action::ToggleUnits(screen.header.toggle_label),
        Action::Temperature,
        Action::WindSpeed,
        Action::Precipitation,
        Action::Quit,
    ]);
    actions
}

/// Feeds each keystroke into the suggestion debouncer and offers the lookup
/// for that exact input. Clones share the list of offered locations, so the
/// submitted line is resolved against what the user actually saw.
#[derive(Debug, Clone)]
struct SuggestionCompleter {
    feed: SuggestionFeed,
    wait: Duration,
    offered: Arc<Mutex<Vec<Location>>>,
}

impl SuggestionCompleter {
    fn new(feed: SuggestionFeed, wait: Duration) -> Self {
        Self {
            feed,
            wait,
            offered: Arc::default(),
        }
    }

    fn offered(&self) -> Vec<Location> {
        self.offered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn submit(&self, input: &str) -> Option<Event> {
        search_event(input, &self.offered())
    }
}

impl Autocomplete for SuggestionCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let offered = self.offered();
        // A completed pick reads "Name, Country", which geocoding would not find.
        if offered.iter().any(|location| location.display_name() == input) {
            return Ok(suggestion_names(&offered));
        }

        let handle = Handle::try_current()?;
        let suggestions =
            tokio::task::block_in_place(|| handle.block_on(self.feed.suggest(input, self.wait)));

        let names = suggestion_names(&suggestions.locations);
        *self.offered.lock().unwrap_or_else(PoisonError::into_inner) = suggestions.locations;
        Ok(names)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

fn suggestion_names(locations: &[Location]) -> Vec<String> {
    locations.iter().map(Location::display_name).collect()
}

/// A picked suggestion loads directly; anything else is a final search.
fn search_event(input: &str, offered: &[Location]) -> Option<Event> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let picked = offered
        .iter()
        .find(|location| location.display_name() == input)
        .cloned();

    Some(match picked {
        Some(location) => Event::LocationSelected(location),
        None => Event::SearchSubmitted(input.to_string()),
    })
}

pub async fn run(mut dashboard: Dashboard, suggestion_count: u8) -> anyhow::Result<()> {
    let (feed, _task) = SuggestionFeed::spawn(dashboard.provider(), suggestion_count, DEBOUNCE);
    let initial = Event::LocationSelected(dashboard.state().location.clone());
    drive(&mut dashboard, initial).await;

    loop {
        let screen = dashboard.screen(Utc::now());
        draw(&screen);

        let Some(action) = skippable(Select::new("What next?", actions(&screen)).prompt())? else {
            break;
        };

        let units = dashboard.state().units;
        let event = match action {
            Action::Quit => break,
            Action::Retry => Some(Event::RetryRequested),
            Action::ToggleUnits(_) => Some(Event::UnitModeToggled),
            Action::Search => prompt_search(&feed)?,
            Action::ChooseDay => prompt_day(&screen)?,
            Action::Temperature => pick_axis("Temperature", &TEMPERATURE_OPTIONS, units.temp)?
                .map(|temp| Event::UnitsChanged(UnitPreference { temp, ..units })),
            Action::WindSpeed => pick_axis("Wind Speed", &SPEED_OPTIONS, units.speed)?
                .map(|speed| Event::UnitsChanged(UnitPreference { speed, ..units })),
            Action::Precipitation => pick_axis("Precipitation", &PRECIP_OPTIONS, units.precip)?
                .map(|precip| Event::UnitsChanged(UnitPreference { precip, ..units })),
        };

        if let Some(event) = event {
            drive(&mut dashboard, event).await;
        }
    }

    Ok(())
}

/// Apply `event`, drawing the loading panel while each request is in flight.
async fn drive(dashboard: &mut Dashboard, event: Event) {
    tracing::debug!(?event, "dispatching");
    let mut effect = dashboard.apply(event);
    while let Some(pending) = effect {
        draw(&dashboard.screen(Utc::now()));
        effect = dashboard.resolve(pending).await;
    }
}

fn draw(screen: &Screen) {
    println!("\n{}", render::screen(screen));
}

fn prompt_search(feed: &SuggestionFeed) -> anyhow::Result<Option<Event>> {
    let completer = SuggestionCompleter::new(feed.clone(), SUGGESTION_WAIT);
    let input = skippable(
        Text::new("Search for a place:")
            .with_autocomplete(completer.clone())
            .with_help_message("Enter searches for the best match; Tab picks a suggestion")
            .prompt(),
    )?;

    Ok(input.and_then(|input| completer.submit(&input)))
}

fn prompt_day(screen: &Screen) -> anyhow::Result<Option<Event>> {
    let Body::Dashboard(view) = &screen.body else {
        return Ok(None);
    };

    let last_day = view.hourly.days.len().saturating_sub(1);
    let picked = skippable(
        Select::new("Hourly forecast for:", view.hourly.days.clone())
            .with_starting_cursor(view.hourly.selected_day.min(last_day))
            .raw_prompt(),
    )?;

    Ok(picked.map(|option| Event::DaySelected(option.index)))
}

fn pick_axis<T: Copy + PartialEq>(
    title: &str,
    options: &[(T, &'static str)],
    current: T,
) -> anyhow::Result<Option<T>> {
    let labels: Vec<&str> = options.iter().map(|(_, label)| *label).collect();
    let cursor = options
        .iter()
        .position(|(unit, _)| *unit == current)
        .unwrap_or(0);

    let picked = skippable(Select::new(title, labels).with_starting_cursor(cursor).raw_prompt())?;
    Ok(picked.and_then(|option| options.get(option.index).map(|(unit, _)| *unit)))
}

/// Esc and Ctrl-C mean "back", not failure.
fn skippable<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

pub fn confirm_retry(error: &DashboardError) -> bool {
    eprintln!("{}", error.user_message());
    Confirm::new("Retry?")
        .with_default(true)
        .prompt()
        .unwrap_or(false)
}

pub async fn configure(mut config: Config) -> anyhow::Result<()> {
    if let Some(temp) = pick_axis("Temperature", &TEMPERATURE_OPTIONS, config.units.temp)? {
        config.units.temp = temp;
    }
    if let Some(speed) = pick_axis("Wind Speed", &SPEED_OPTIONS, config.units.speed)? {
        config.units.speed = speed;
    }
    if let Some(precip) = pick_axis("Precipitation", &PRECIP_OPTIONS, config.units.precip)? {
        config.units.precip = precip;
    }

    let question = format!(
        "Change default location (currently {})?",
        config.default_location.display_name()
    );
    let change = skippable(Confirm::new(&question).with_default(false).prompt())?.unwrap_or(false);

    if change {
        if let Some(location) = prompt_default_location(&config).await? {
            config.default_location = location;
        }
    }

    config.save()?;
    println!(
        "Saved configuration to {} (units: {}, location: {})",
        Config::config_file_path()?.display(),
        render::units_summary(&config.units),
        config.default_location.display_name()
    );
    Ok(())
}

async fn prompt_default_location(config: &Config) -> anyhow::Result<Option<Location>> {
    let Some(query) = skippable(Text::new("Place name:").prompt())? else {
        return Ok(None);
    };

    let provider = provider_from_config(config)?;
    let mut candidates = provider
        .search_locations(query.trim(), config.suggestion_count)
        .await
        .with_context(|| format!("Location search for '{query}' failed"))?;

    if candidates.is_empty() {
        println!("No search result found!");
        return Ok(None);
    }

    let lines: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, location)| render::location_line(i, location))
        .collect();
    let picked = skippable(Select::new("Pick a location:", lines).raw_prompt())?;

    Ok(picked.map(|option| candidates.swap_remove(option.index)))
}
