use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::FetchError,
    icons::{self, IconKey, WeatherTheme},
};

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, FetchError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        if !valid {
            return Err(FetchError::InvalidCoordinates { lat, lon });
        }

        Ok(Self { lat, lon })
    }
}

/// What the user asked for: a place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Build a place query from free text. Blank input is rejected.
    pub fn place(text: &str) -> Result<Self, FetchError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(FetchError::EmptyQuery);
        }
        Ok(Self::Place(trimmed.to_string()))
    }

    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, FetchError> {
        Coordinates::new(lat, lon).map(Self::Coordinates)
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Place(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.lat, c.lon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the provider's `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Air-quality index bucket as reported by the provider (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

impl AqiLevel {
    pub fn from_index(index: Option<i64>) -> Self {
        match index {
            Some(1) => AqiLevel::Good,
            Some(2) => AqiLevel::Fair,
            Some(3) => AqiLevel::Moderate,
            Some(4) => AqiLevel::Poor,
            Some(5) => AqiLevel::VeryPoor,
            _ => AqiLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Fair => "Fair",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
            AqiLevel::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub description: String,
    pub icon: IconKey,
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_direction_deg: u16,
    pub pressure_hpa: u32,
    /// Kilometres, rounded to one decimal.
    pub visibility_km: Option<f64>,
    pub sunrise: String,
    pub sunset: String,
    pub aqi: AqiLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: String,
    pub temperature: i64,
    pub icon: IconKey,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: String,
    pub temperature: i64,
    pub icon: IconKey,
}

/// Everything the dashboard renders for one successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub units: UnitSystem,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<ForecastEntry>,
    /// Raw provider icon code of the primary condition, e.g. "10d".
    pub condition_code: String,
}

impl WeatherView {
    pub fn theme(&self) -> WeatherTheme {
        icons::theme_for(&self.condition_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1), "Good")]
    #[case(Some(2), "Fair")]
    #[case(Some(3), "Moderate")]
    #[case(Some(4), "Poor")]
    #[case(Some(5), "Very Poor")]
    #[case(Some(0), "Unknown")]
    #[case(Some(6), "Unknown")]
    #[case(Some(-1), "Unknown")]
    #[case(None, "Unknown")]
    fn aqi_labels(#[case] index: Option<i64>, #[case] expected: &str) {
        assert_eq!(AqiLevel::from_index(index).label(), expected);
    }

    #[test]
    fn blank_place_is_rejected() {
        assert!(matches!(LocationQuery::place("   "), Err(FetchError::EmptyQuery)));
        assert!(matches!(LocationQuery::place(""), Err(FetchError::EmptyQuery)));
    }

    #[test]
    fn place_is_trimmed() {
        let query = LocationQuery::place("  Pune \n").expect("non-blank query");
        assert_eq!(query, LocationQuery::Place("Pune".to_string()));
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 0.0)]
    #[case(0.0, 180.1)]
    #[case(f64::NAN, 10.0)]
    fn out_of_range_coordinates_are_rejected(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            LocationQuery::coordinates(lat, lon),
            Err(FetchError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn unit_system_parses_and_toggles() {
        let units: UnitSystem = "Imperial".parse().expect("known unit system");
        assert_eq!(units, UnitSystem::Imperial);
        assert_eq!(units.toggled(), UnitSystem::Metric);
        assert_eq!(units.temperature_suffix(), "°F");
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }
}
