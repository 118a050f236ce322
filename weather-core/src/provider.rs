use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, LocationQuery, UnitSystem},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Remote source of raw weather payloads.
///
/// Implementations classify failures themselves: a place or coordinate pair the
/// provider cannot resolve is `LocationNotFound`, everything else that goes wrong
/// on the wire or while decoding is `NetworkOrParse`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions; for a place query this also resolves its coordinates.
    async fn current(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<CurrentPayload, FetchError>;

    /// 3-hour-interval forecast points, oldest first.
    async fn forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastPayload, FetchError>;

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityPayload, FetchError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn current(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<CurrentPayload, FetchError> {
        (**self).current(query, units).await
    }

    async fn forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastPayload, FetchError> {
        (**self).forecast(coords, units).await
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityPayload, FetchError> {
        (**self).air_quality(coords).await
    }
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.resolved_api_key()?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key, base_url)?,
        None => OpenWeatherProvider::new(api_key)?,
    };

    Ok(Box::new(provider))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sun {
    pub sunrise: i64,
    pub sunset: i64,
}

/// Payload of the current-conditions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub coord: Coordinates,
    pub main: CurrentMain,
    pub wind: Wind,
    pub weather: Vec<Condition>,
    /// Metres.
    pub visibility: Option<u32>,
    pub sys: Sun,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: i32,
}

/// Payload of the 5-day/3-hour forecast endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastItem>,
    pub city: ForecastCity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirQualityMain {
    pub aqi: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirQualityItem {
    pub main: AirQualityMain,
}

/// Payload of the air-pollution endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirQualityPayload {
    #[serde(default)]
    pub list: Vec<AirQualityItem>,
}

impl AirQualityPayload {
    pub fn index(&self) -> Option<i64> {
        self.list.first().and_then(|item| item.main.aqi)
    }
}
