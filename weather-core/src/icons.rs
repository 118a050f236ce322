//! Static lookups from provider icon codes to local glyphs and background themes.
//!
//! Both lookups are total: any code, including garbage, resolves to a value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Local glyph shown for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKey {
    Clear,
    Cloud,
    Drizzle,
    Rain,
    Snow,
}

impl IconKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKey::Clear => "clear",
            IconKey::Cloud => "cloud",
            IconKey::Drizzle => "drizzle",
            IconKey::Rain => "rain",
            IconKey::Snow => "snow",
        }
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background theme picked from the condition family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherTheme {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Default,
}

impl WeatherTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherTheme::Clear => "clear",
            WeatherTheme::Clouds => "clouds",
            WeatherTheme::Rain => "rain",
            WeatherTheme::Thunderstorm => "thunderstorm",
            WeatherTheme::Snow => "snow",
            WeatherTheme::Mist => "mist",
            WeatherTheme::Default => "default",
        }
    }
}

impl fmt::Display for WeatherTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a provider icon code ("10d", "01n", ...) to a local glyph.
pub fn icon_key(code: &str) -> IconKey {
    match code {
        "01d" | "01n" => IconKey::Clear,
        "02d" | "02n" | "03d" | "03n" => IconKey::Cloud,
        "04d" | "04n" => IconKey::Drizzle,
        "09d" | "09n" | "10d" | "10n" | "11d" | "11n" => IconKey::Rain,
        "13d" | "13n" => IconKey::Snow,
        _ => IconKey::Clear,
    }
}

/// Map a provider icon code to a theme using its two-digit family.
pub fn theme_for(code: &str) -> WeatherTheme {
    match code.get(..2) {
        Some("01") => WeatherTheme::Clear,
        Some("02" | "03" | "04") => WeatherTheme::Clouds,
        Some("09" | "10") => WeatherTheme::Rain,
        Some("11") => WeatherTheme::Thunderstorm,
        Some("13") => WeatherTheme::Snow,
        Some("50") => WeatherTheme::Mist,
        _ => WeatherTheme::Default,
    }
}
