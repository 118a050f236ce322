use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Coordinates, LocationQuery, UnitSystem},
};

use super::{AirQualityPayload, CurrentPayload, ForecastPayload, WeatherProvider};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a local mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&str, String)>,
        subject: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(path, subject, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(path, status = %status, "OpenWeather responded");

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(subject));
        }

        if !status.is_success() {
            return Err(FetchError::network(format!(
                "OpenWeather {path} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let value: Value = serde_json::from_str(&body)?;
        check_cod(&value, subject)?;

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<CurrentPayload, FetchError> {
        let mut params = location_params(query);
        params.push(("units", units.as_str().to_string()));

        self.get_json("/data/2.5/weather", params, &query.to_string()).await
    }

    async fn forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastPayload, FetchError> {
        let query = LocationQuery::Coordinates(coords);
        let mut params = location_params(&query);
        params.push(("units", units.as_str().to_string()));

        self.get_json("/data/2.5/forecast", params, &query.to_string()).await
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityPayload, FetchError> {
        let query = LocationQuery::Coordinates(coords);

        self.get_json("/data/2.5/air_pollution", location_params(&query), &query.to_string())
            .await
    }
}

fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::Place(name) => vec![("q", name.clone())],
        LocationQuery::Coordinates(c) => {
            vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
        }
    }
}

/// OpenWeather may report errors in a `cod` field, as a number or a string.
fn check_cod(value: &Value, subject: &str) -> Result<(), FetchError> {
    let code = match value.get("cod") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        _ => None,
    };

    match code {
        None | Some(200) => Ok(()),
        Some(404) => Err(FetchError::not_found(subject)),
        Some(other) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            Err(FetchError::network(format!(
                "OpenWeather returned code {other}: {}",
                truncate_body(message)
            )))
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
