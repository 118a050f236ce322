//! Application state for the dashboard and the transitions between lookups.
//!
//! Every lookup is tagged with a [`LookupToken`] when it starts. A result is
//! applied only if its token is the most recently issued one; anything older is
//! dropped, so a slow earlier lookup cannot overwrite a newer one.
//!
//! The built-in operations ([`DashboardController::search`], `locate`, `show`,
//! `toggle_units`) hold `&mut self` across the fetch, so they never overlap with
//! each other. The token check guards callers that drive
//! [`DashboardController::start_lookup`], `succeed` and `fail` themselves, e.g.
//! when lookups run on separate tasks.
//!
//! A unit toggle repeats the last lookup that succeeded. After a failed search
//! it brings back the previous place in the new units.

use crate::{
    aggregator::WeatherAggregator,
    error::FetchError,
    model::{LocationQuery, UnitSystem, WeatherView},
    recent::RecentSearchesStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LookupToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Idle,
    Loading,
    Ready(WeatherView),
    Failed(FetchError),
}

impl LookupState {
    pub fn view(&self) -> Option<&WeatherView> {
        match self {
            LookupState::Ready(view) => Some(view),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DashboardController {
    aggregator: WeatherAggregator,
    recent: RecentSearchesStore,
    units: UnitSystem,
    state: LookupState,
    last_query: Option<LocationQuery>,
    issued: u64,
}

impl DashboardController {
    pub fn new(
        aggregator: WeatherAggregator,
        recent: RecentSearchesStore,
        units: UnitSystem,
    ) -> Self {
        Self {
            aggregator,
            recent,
            units,
            state: LookupState::Idle,
            last_query: None,
            issued: 0,
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn recent(&self) -> &[String] {
        self.recent.entries()
    }

    /// Issue a fresh token and enter the loading state.
    pub fn start_lookup(&mut self) -> LookupToken {
        self.issued += 1;
        self.state = LookupState::Loading;
        LookupToken(self.issued)
    }

    fn is_current(&self, token: LookupToken) -> bool {
        token.0 == self.issued
    }

    /// Apply a successful result. Returns `false` if `token` is stale.
    pub fn succeed(&mut self, token: LookupToken, view: WeatherView) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                token = token.0,
                latest = self.issued,
                "Discarding stale lookup result"
            );
            return false;
        }
        self.state = LookupState::Ready(view);
        true
    }

    /// Apply a failure. Returns `false` if `token` is stale.
    pub fn fail(&mut self, token: LookupToken, error: FetchError) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                token = token.0,
                latest = self.issued,
                "Discarding stale lookup failure"
            );
            return false;
        }
        tracing::debug!(error = %error, "Lookup failed");
        self.state = LookupState::Failed(error);
        true
    }

    /// A search typed by the user. Recorded in recent searches when it succeeds.
    pub async fn search(&mut self, text: &str) -> &LookupState {
        let token = self.start_lookup();

        let query = match LocationQuery::place(text) {
            Ok(query) => query,
            Err(err) => {
                self.fail(token, err);
                return &self.state;
            }
        };

        let name = query.to_string();
        if self.run(token, query).await {
            self.recent.record(&name);
        }
        &self.state
    }

    /// Lookup by the device's position. Never touches recent searches.
    pub async fn locate(&mut self, lat: f64, lon: f64) -> &LookupState {
        let token = self.start_lookup();

        match LocationQuery::coordinates(lat, lon) {
            Ok(query) => {
                self.run(token, query).await;
            }
            Err(err) => {
                self.fail(token, err);
            }
        }
        &self.state
    }

    /// Lookup of a place that did not come from user text entry (e.g. the
    /// startup default). Never touches recent searches.
    pub async fn show(&mut self, query: LocationQuery) -> &LookupState {
        let token = self.start_lookup();
        self.run(token, query).await;
        &self.state
    }

    /// Flip the unit system and repeat the last lookup in the new units.
    pub async fn toggle_units(&mut self) -> &LookupState {
        self.units = self.units.toggled();
        tracing::debug!(units = %self.units, "Unit system toggled");

        if let Some(query) = self.last_query.clone() {
            let token = self.start_lookup();
            self.run(token, query).await;
        }
        &self.state
    }

    /// Run one lookup and apply its outcome. Returns `true` if a fresh view was applied.
    async fn run(&mut self, token: LookupToken, query: LocationQuery) -> bool {
        let result = self.aggregator.fetch_weather(&query, self.units).await;

        match result {
            Ok(view) => {
                let applied = self.succeed(token, view);
                if applied {
                    self.last_query = Some(query);
                }
                applied
            }
            Err(err) => {
                self.fail(token, err);
                false
            }
        }
    }
}
