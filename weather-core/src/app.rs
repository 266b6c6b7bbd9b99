//! Application state and the reducer that drives it.
//!
//! User actions and fetch completions are typed [`Event`]s. Reducing an event
//! yields a new [`AppState`] plus at most one [`Effect`] (a network request)
//! for the caller to perform. Each request carries a [`RequestToken`]; a
//! completion whose token is not the most recently issued one is dropped, so
//! a slow response for a superseded location never overwrites newer data.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{DashboardError, ProviderError},
    forecast::FORECAST_DAYS,
    model::{Location, WeatherSnapshot},
    provider::WeatherProvider,
    units::{UnitPreference, toggled_preset},
    view::Screen,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Loading,
    Ready,
    Failed(DashboardError),
}

/// The request a retry re-issues.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRequest {
    Search(String),
    Forecast(Location),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UnitsChanged(UnitPreference),
    /// Switch between the metric and imperial presets.
    UnitModeToggled,
    LocationSelected(Location),
    DaySelected(usize),
    SearchSubmitted(String),
    RetryRequested,
    SearchCompleted {
        token: RequestToken,
        result: Result<Vec<Location>, ProviderError>,
    },
    ForecastCompleted {
        token: RequestToken,
        result: Result<WeatherSnapshot, ProviderError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Geocode {
        token: RequestToken,
        query: String,
    },
    FetchForecast {
        token: RequestToken,
        location: Location,
        units: UnitPreference,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Bumped on every transition that changes the state.
    pub version: u64,
    pub units: UnitPreference,
    pub location: Location,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub selected_day: usize,
    pub status: Status,
    pub last_token: RequestToken,
    pub pending: Option<PendingRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn unchanged(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            effect: None,
        }
    }
}

impl AppState {
    pub fn new(units: UnitPreference, location: Location) -> Self {
        Self {
            version: 0,
            units,
            location,
            snapshot: None,
            selected_day: 0,
            status: Status::Loading,
            last_token: RequestToken::default(),
            pending: None,
        }
    }

    pub fn reduce(&self, event: Event) -> Transition {
        match event {
            Event::UnitsChanged(units) => {
                if units == self.units {
                    return Transition::unchanged(self);
                }
                let mut next = self.successor();
                next.units = units;
                tracing::info!(?units, "units changed");
                next.issue_forecast()
            }
            Event::UnitModeToggled => self.reduce(Event::UnitsChanged(toggled_preset(&self.units))),
            Event::LocationSelected(location) => {
                let mut next = self.successor();
                tracing::info!(location = %location.display_name(), "location selected");
                next.location = location;
                next.issue_forecast()
            }
            Event::DaySelected(day) => {
                if day >= FORECAST_DAYS || day == self.selected_day {
                    return Transition::unchanged(self);
                }
                let mut next = self.successor();
                next.selected_day = day;
                Transition {
                    state: next,
                    effect: None,
                }
            }
            Event::SearchSubmitted(query) => {
                let query = query.trim();
                if query.is_empty() {
                    return Transition::unchanged(self);
                }
                self.successor().issue_search(query.to_string())
            }
            Event::RetryRequested => match (&self.status, self.pending.clone()) {
                (Status::Failed(err), Some(PendingRequest::Forecast(location)))
                    if err.is_retryable() =>
                {
                    let mut next = self.successor();
                    next.location = location;
                    next.issue_forecast()
                }
                (Status::Failed(err), Some(PendingRequest::Search(query)))
                    if err.is_retryable() =>
                {
                    self.successor().issue_search(query)
                }
                _ => Transition::unchanged(self),
            },
            Event::SearchCompleted { token, result } => {
                if self.is_stale(token) {
                    return Transition::unchanged(self);
                }
                let query = match &self.pending {
                    Some(PendingRequest::Search(query)) => query.clone(),
                    _ => String::new(),
                };

                match result {
                    Ok(locations) => match locations.into_iter().next() {
                        Some(best) => self.reduce(Event::LocationSelected(best)),
                        None => {
                            tracing::info!(%query, "search returned no results");
                            self.failed(DashboardError::NoResults { query })
                        }
                    },
                    Err(error) => {
                        tracing::warn!(%query, %error, "location search failed");
                        self.failed(DashboardError::NetworkUnavailable(error))
                    }
                }
            }
            Event::ForecastCompleted { token, result } => {
                if self.is_stale(token) {
                    return Transition::unchanged(self);
                }
                match result {
                    Ok(snapshot) => {
                        let mut next = self.successor();
                        next.snapshot = Some(Arc::new(snapshot));
                        next.selected_day = 0;
                        next.status = Status::Ready;
                        Transition {
                            state: next,
                            effect: None,
                        }
                    }
                    Err(error) => {
                        tracing::warn!(
                            location = %self.location.display_name(),
                            %error,
                            "forecast fetch failed"
                        );
                        self.failed(DashboardError::NetworkUnavailable(error))
                    }
                }
            }
        }
    }

    /// Whether the dashboard is waiting on the request behind `token`.
    pub fn is_stale(&self, token: RequestToken) -> bool {
        let stale = token != self.last_token || self.status != Status::Loading;
        if stale {
            tracing::warn!(?token, latest = ?self.last_token, "discarding stale response");
        }
        stale
    }

    fn successor(&self) -> Self {
        let mut next = self.clone();
        next.version += 1;
        next
    }

    fn failed(&self, error: DashboardError) -> Transition {
        let mut next = self.successor();
        next.status = Status::Failed(error);
        Transition {
            state: next,
            effect: None,
        }
    }

    fn issue_forecast(mut self) -> Transition {
        self.last_token = self.last_token.next();
        self.status = Status::Loading;
        // Data for another location or other units must not linger.
        self.snapshot = None;
        self.pending = Some(PendingRequest::Forecast(self.location.clone()));

        let effect = Effect::FetchForecast {
            token: self.last_token,
            location: self.location.clone(),
            units: self.units,
        };
        Transition {
            state: self,
            effect: Some(effect),
        }
    }

    fn issue_search(mut self, query: String) -> Transition {
        self.last_token = self.last_token.next();
        self.status = Status::Loading;
        self.pending = Some(PendingRequest::Search(query.clone()));

        let effect = Effect::Geocode {
            token: self.last_token,
            query,
        };
        Transition {
            state: self,
            effect: Some(effect),
        }
    }
}

/// Owns the state and the provider, and performs effects in order.
#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    state: AppState,
    search_count: u8,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, state: AppState, search_count: u8) -> Self {
        Self {
            provider,
            state,
            search_count,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    /// Load the forecast for the initial location.
    pub async fn start(&mut self) -> &AppState {
        let location = self.state.location.clone();
        self.dispatch(Event::LocationSelected(location)).await
    }

    /// Reduce `event`, then run effects until the state settles.
    pub async fn dispatch(&mut self, event: Event) -> &AppState {
        let mut effect = self.apply(event);
        while let Some(pending) = effect {
            effect = self.resolve(pending).await;
        }
        &self.state
    }

    /// Reduce `event` without touching the network. The returned effect is
    /// the request the new state is waiting on.
    pub fn apply(&mut self, event: Event) -> Option<Effect> {
        let Transition { state, effect } = self.state.reduce(event);
        self.state = state;
        effect
    }

    /// Perform `effect` and reduce its completion.
    pub async fn resolve(&mut self, effect: Effect) -> Option<Effect> {
        let completion = self.perform(effect).await;
        self.apply(completion)
    }

    /// Run one effect against the provider and return its completion event.
    pub async fn perform(&self, effect: Effect) -> Event {
        match effect {
            Effect::Geocode { token, query } => {
                let result = self
                    .provider
                    .search_locations(&query, self.search_count)
                    .await;
                Event::SearchCompleted { token, result }
            }
            Effect::FetchForecast {
                token,
                location,
                units,
            } => {
                let result = self.provider.fetch_forecast(&location, &units).await;
                Event::ForecastCompleted { token, result }
            }
        }
    }

    pub fn screen(&self, utc_now: DateTime<Utc>) -> Screen {
        Screen::build(&self.state, utc_now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubProvider, sample_snapshot};
    use crate::units::PrecipUnit;

    fn oslo() -> Location {
        Location::new("Oslo", Some("Norway".into()), 59.91, 10.75)
    }

    fn loaded_state() -> AppState {
        let state = AppState::new(UnitPreference::METRIC, Location::berlin());
        let Transition { state, effect } =
            state.reduce(Event::LocationSelected(Location::berlin()));
        let Some(Effect::FetchForecast { token, .. }) = effect else {
            panic!("expected a forecast fetch");
        };
        state
            .reduce(Event::ForecastCompleted {
                token,
                result: Ok(sample_snapshot(18.0)),
            })
            .state
    }

    #[test]
    fn location_selection_issues_forecast_fetch() {
        let state = AppState::new(UnitPreference::METRIC, Location::berlin());
        let transition = state.reduce(Event::LocationSelected(oslo()));

        assert_eq!(transition.state.status, Status::Loading);
        assert_eq!(transition.state.location, oslo());
        assert_eq!(transition.state.version, 1);
        assert_eq!(
            transition.effect,
            Some(Effect::FetchForecast {
                token: transition.state.last_token,
                location: oslo(),
                units: UnitPreference::METRIC,
            })
        );
    }

    #[test]
    fn reducer_does_not_mutate_previous_state() {
        let before = loaded_state();
        let copy = before.clone();
        let _ = before.reduce(Event::LocationSelected(oslo()));
        assert_eq!(before, copy);
    }

    #[test]
    fn completed_forecast_replaces_snapshot_and_resets_day() {
        let mut state = loaded_state();
        state = state.reduce(Event::DaySelected(3)).state;
        assert_eq!(state.selected_day, 3);

        let Transition { state, effect } = state.reduce(Event::LocationSelected(oslo()));
        assert!(state.snapshot.is_none());
        let Some(Effect::FetchForecast { token, .. }) = effect else {
            panic!("expected a forecast fetch");
        };

        let state = state
            .reduce(Event::ForecastCompleted {
                token,
                result: Ok(sample_snapshot(4.5)),
            })
            .state;

        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.selected_day, 0);
        assert_eq!(state.snapshot.as_ref().map(|s| s.current.temperature), Some(4.5));
    }

    #[test]
    fn stale_forecast_is_discarded() {
        let state = AppState::new(UnitPreference::METRIC, Location::berlin());
        let first = state.reduce(Event::LocationSelected(Location::berlin()));
        let Some(Effect::FetchForecast { token: berlin_token, .. }) = first.effect else {
            panic!("expected a forecast fetch");
        };

        let second = first.state.reduce(Event::LocationSelected(oslo()));
        let Some(Effect::FetchForecast { token: oslo_token, .. }) = second.effect else {
            panic!("expected a forecast fetch");
        };
        assert!(oslo_token > berlin_token);

        // Berlin answers late.
        let late = second.state.reduce(Event::ForecastCompleted {
            token: berlin_token,
            result: Ok(sample_snapshot(1.0)),
        });
        assert_eq!(late.state, second.state);
        assert_eq!(late.state.status, Status::Loading);

        let done = late.state.reduce(Event::ForecastCompleted {
            token: oslo_token,
            result: Ok(sample_snapshot(2.0)),
        });
        assert_eq!(done.state.status, Status::Ready);
        assert_eq!(done.state.location, oslo());
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let state = AppState::new(UnitPreference::METRIC, Location::berlin());
        let Transition { state, effect } =
            state.reduce(Event::LocationSelected(Location::berlin()));
        let Some(Effect::FetchForecast { token, .. }) = effect else {
            panic!("expected a forecast fetch");
        };

        let ready = state
            .reduce(Event::ForecastCompleted {
                token,
                result: Ok(sample_snapshot(1.0)),
            })
            .state;
        let again = ready.reduce(Event::ForecastCompleted {
            token,
            result: Err(ProviderError::Transport("late failure".into())),
        });
        assert_eq!(again.state.status, Status::Ready);
    }

    #[test]
    fn unit_change_applies_before_refetch() {
        let state = loaded_state();
        let Transition { state, effect } = state.reduce(Event::UnitModeToggled);

        assert_eq!(state.units, UnitPreference::IMPERIAL);
        assert!(state.snapshot.is_none());
        match effect {
            Some(Effect::FetchForecast { units, location, .. }) => {
                assert_eq!(units, UnitPreference::IMPERIAL);
                assert_eq!(location, Location::berlin());
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn unchanged_units_do_not_refetch() {
        let state = loaded_state();
        let transition = state.reduce(Event::UnitsChanged(UnitPreference::METRIC));
        assert!(transition.effect.is_none());
        assert_eq!(transition.state, state);

        let mixed = UnitPreference {
            precip: PrecipUnit::Inch,
            ..UnitPreference::METRIC
        };
        assert!(state.reduce(Event::UnitsChanged(mixed)).effect.is_some());
    }

    #[test]
    fn day_selection_is_bounded() {
        let state = loaded_state();
        assert_eq!(state.reduce(Event::DaySelected(6)).state.selected_day, 6);
        assert_eq!(state.reduce(Event::DaySelected(7)).state.selected_day, 0);
    }

    #[test]
    fn search_picks_first_result() {
        let state = loaded_state();
        let Transition { state, effect } = state.reduce(Event::SearchSubmitted("  Oslo ".into()));
        let Some(Effect::Geocode { token, query }) = effect else {
            panic!("expected a geocode request");
        };
        assert_eq!(query, "Oslo");

        let transition = state.reduce(Event::SearchCompleted {
            token,
            result: Ok(vec![oslo(), Location::berlin()]),
        });
        assert_eq!(transition.state.location, oslo());
        assert!(matches!(
            transition.effect,
            Some(Effect::FetchForecast { ref location, .. }) if *location == oslo()
        ));
    }

    #[test]
    fn empty_search_reports_no_results() {
        let state = loaded_state();
        let Transition { state, effect } = state.reduce(Event::SearchSubmitted("Xyzzy".into()));
        let Some(Effect::Geocode { token, .. }) = effect else {
            panic!("expected a geocode request");
        };

        let state = state
            .reduce(Event::SearchCompleted {
                token,
                result: Ok(Vec::new()),
            })
            .state;
        assert_eq!(
            state.status,
            Status::Failed(DashboardError::NoResults {
                query: "Xyzzy".into()
            })
        );
        // Nothing to retry for an empty result.
        assert!(state.reduce(Event::RetryRequested).effect.is_none());
    }

    #[test]
    fn blank_search_is_ignored() {
        let state = loaded_state();
        let transition = state.reduce(Event::SearchSubmitted("   ".into()));
        assert!(transition.effect.is_none());
        assert_eq!(transition.state, state);
    }

    #[test]
    fn retry_reissues_failed_forecast() {
        let state = AppState::new(UnitPreference::METRIC, Location::berlin());
        let Transition { state, effect } = state.reduce(Event::LocationSelected(oslo()));
        let Some(Effect::FetchForecast { token, .. }) = effect else {
            panic!("expected a forecast fetch");
        };

        let failed = state
            .reduce(Event::ForecastCompleted {
                token,
                result: Err(ProviderError::Http {
                    status: 502,
                    message: "Bad Gateway".into(),
                }),
            })
            .state;
        assert!(matches!(
            failed.status,
            Status::Failed(DashboardError::NetworkUnavailable(_))
        ));

        let retry = failed.reduce(Event::RetryRequested);
        match retry.effect {
            Some(Effect::FetchForecast {
                token: retry_token,
                location,
                ..
            }) => {
                assert!(retry_token > token);
                assert_eq!(location, oslo());
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(retry.state.status, Status::Loading);
    }

    #[test]
    fn retry_reissues_failed_search() {
        let state = loaded_state();
        let Transition { state, effect } = state.reduce(Event::SearchSubmitted("Oslo".into()));
        let Some(Effect::Geocode { token, .. }) = effect else {
            panic!("expected a geocode request");
        };

        let failed = state
            .reduce(Event::SearchCompleted {
                token,
                result: Err(ProviderError::Transport("connection reset".into())),
            })
            .state;

        let retry = failed.reduce(Event::RetryRequested);
        assert!(matches!(
            retry.effect,
            Some(Effect::Geocode { ref query, .. }) if query == "Oslo"
        ));
    }

    #[test]
    fn retry_without_failure_does_nothing() {
        let state = loaded_state();
        assert!(state.reduce(Event::RetryRequested).effect.is_none());
    }

    #[tokio::test]
    async fn dashboard_runs_search_through_to_forecast() {
        let provider = Arc::new(StubProvider::new().with_locations(vec![oslo()]));
        let mut dashboard = Dashboard::new(
            provider.clone(),
            AppState::new(UnitPreference::METRIC, Location::berlin()),
            5,
        );

        dashboard.start().await;
        assert_eq!(dashboard.state().status, Status::Ready);

        let state = dashboard.dispatch(Event::SearchSubmitted("Oslo".into())).await;
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.location, oslo());
        assert_eq!(provider.searches(), vec!["Oslo".to_string()]);
        assert_eq!(provider.forecasts(), 2);
    }

    #[tokio::test]
    async fn applied_event_stays_loading_until_resolved() {
        let provider = Arc::new(StubProvider::new().with_locations(vec![oslo()]));
        let mut dashboard = Dashboard::new(
            provider.clone(),
            AppState::new(UnitPreference::METRIC, Location::berlin()),
            5,
        );

        let effect = dashboard.apply(Event::SearchSubmitted("Oslo".into()));
        assert!(matches!(effect, Some(Effect::Geocode { .. })));
        assert_eq!(dashboard.state().status, Status::Loading);
        assert!(provider.searches().is_empty());

        let effect = dashboard.resolve(effect.expect("geocode issued")).await;
        assert!(matches!(effect, Some(Effect::FetchForecast { .. })));
        assert_eq!(dashboard.state().status, Status::Loading);
        assert_eq!(dashboard.state().location, oslo());

        let effect = dashboard.resolve(effect.expect("fetch issued")).await;
        assert_eq!(effect, None);
        assert_eq!(dashboard.state().status, Status::Ready);
        assert_eq!(provider.forecasts(), 1);
    }

    #[tokio::test]
    async fn dashboard_surfaces_unavailable_and_recovers_on_retry() {
        let provider = Arc::new(StubProvider::new().failing_forecasts(1));
        let mut dashboard = Dashboard::new(
            provider.clone(),
            AppState::new(UnitPreference::METRIC, Location::berlin()),
            5,
        );

        let state = dashboard.start().await;
        assert!(matches!(
            state.status,
            Status::Failed(DashboardError::NetworkUnavailable(_))
        ));

        let state = dashboard.dispatch(Event::RetryRequested).await;
        assert_eq!(state.status, Status::Ready);
        assert_eq!(provider.forecasts(), 2);
    }
}
