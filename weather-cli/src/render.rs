use std::fmt::Write;

use weather_core::{LookupState, UnitSystem, WeatherView};

pub fn render_state(state: &LookupState) -> String {
    match state {
        LookupState::Idle => "No weather data available".to_string(),
        LookupState::Loading => "Loading...".to_string(),
        LookupState::Ready(view) => render_view(view),
        LookupState::Failed(err) => err.user_message(),
    }
}

pub fn render_view(view: &WeatherView) -> String {
    let c = &view.current;
    let temp = view.units.temperature_suffix();
    let speed = view.units.speed_suffix();

    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]  theme: {}", c.location_name, c.icon, view.theme());
    let _ = writeln!(out, "{}{temp}  {}", c.temperature, c.description);
    let _ = writeln!(out, "Feels like {}{temp}", c.feels_like);
    let _ = writeln!(out, "Humidity   {}%", c.humidity_pct);
    let _ = writeln!(out, "Wind       {} {speed} from {}°", c.wind_speed, c.wind_direction_deg);
    let _ = writeln!(out, "Pressure   {} hPa", c.pressure_hpa);
    match c.visibility_km {
        Some(km) => {
            let _ = writeln!(out, "Visibility {km:.1} km");
        }
        None => {
            let _ = writeln!(out, "Visibility --");
        }
    }
    let _ = writeln!(out, "Sunrise    {}   Sunset {}", c.sunrise, c.sunset);
    let _ = writeln!(out, "Air        {}", c.aqi.label());

    if !view.hourly.is_empty() {
        let _ = writeln!(out, "\nNext 24 hours");
        let strip: Vec<String> = view
            .hourly
            .iter()
            .map(|h| format!("{} {}{temp} {}", h.time, h.temperature, h.icon))
            .collect();
        let _ = writeln!(out, "  {}", strip.join(" | "));
    }

    if !view.daily.is_empty() {
        let _ = writeln!(out, "\n{}-day forecast", view.daily.len());
        for day in &view.daily {
            let _ = writeln!(
                out,
                "  {:<12} {:>4}{temp}  {:<8} {}",
                day.date, day.temperature, day.icon, day.condition
            );
        }
    }

    out.trim_end().to_string()
}

/// Help line under the search prompt: recent searches and the unit toggle.
pub fn prompt_help(recent: &[String], units: UnitSystem) -> String {
    let toggle = format!(":u switch to {}, :q quit", units.toggled());
    if recent.is_empty() {
        toggle
    } else {
        format!("Recent: {}  ({toggle})", recent.join(", "))
    }
}
