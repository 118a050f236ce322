//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap provider and its raw payloads
//! - The aggregator that turns provider payloads into a dashboard view
//! - Icon and theme lookups
//! - Recent-search persistence and the dashboard controller
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod aggregator;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod icons;
pub mod model;
pub mod provider;
pub mod recent;

pub use aggregator::WeatherAggregator;
pub use config::Config;
pub use controller::{DashboardController, LookupState, LookupToken};
pub use error::FetchError;
pub use icons::{IconKey, WeatherTheme};
pub use model::{
    AqiLevel, Coordinates, CurrentConditions, ForecastEntry, HourlyEntry, LocationQuery,
    UnitSystem, WeatherView,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use recent::{FileStore, KeyValueStore, MemoryStore, RecentSearchesStore};
