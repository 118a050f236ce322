//! Turns up to three provider calls into one [`WeatherView`].

use chrono::{FixedOffset, Timelike};

use crate::{
    error::FetchError,
    format::{self, DAY_FORMAT, HOUR_FORMAT, SUN_TIME_FORMAT},
    icons::icon_key,
    model::{
        AqiLevel, CurrentConditions, ForecastEntry, HourlyEntry, LocationQuery, UnitSystem,
        WeatherView,
    },
    provider::{
        AirQualityPayload, Condition, CurrentPayload, ForecastItem, ForecastPayload,
        WeatherProvider,
    },
};

pub const MAX_DAILY_ENTRIES: usize = 5;
pub const HOURLY_ENTRIES: usize = 8;

const MIDDAY_SECS: i64 = 12 * 60 * 60;
/// Half of the provider's 3-hour sampling interval.
const MIDDAY_TOLERANCE_SECS: i64 = 90 * 60;

#[derive(Debug)]
pub struct WeatherAggregator {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherAggregator {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Look up current conditions, forecast and air quality for `query`.
    ///
    /// A place name is resolved through the current-conditions call first, since
    /// the air-quality endpoint only accepts coordinates. The remaining calls run
    /// concurrently. Any failure aborts the lookup; no partial view is returned.
    pub async fn fetch_weather(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<WeatherView, FetchError> {
        let provider = self.provider.as_ref();

        let (current, forecast, air) = match query {
            LocationQuery::Place(name) => {
                tracing::debug!(place = %name, "Resolving place through current conditions");
                let current = provider.current(query, units).await?;
                let coords = current.coord;

                let (forecast, air) = tokio::try_join!(
                    provider.forecast(coords, units),
                    provider.air_quality(coords),
                )?;
                (current, forecast, air)
            }
            LocationQuery::Coordinates(coords) => tokio::try_join!(
                provider.current(query, units),
                provider.forecast(*coords, units),
                provider.air_quality(*coords),
            )?,
        };

        let view = build_view(current, &forecast, &air, units)?;

        tracing::info!(
            location = %view.current.location_name,
            temp = view.current.temperature,
            code = %view.condition_code,
            "Weather lookup succeeded"
        );

        Ok(view)
    }
}

/// Assemble the view from the three raw payloads.
pub fn build_view(
    current: CurrentPayload,
    forecast: &ForecastPayload,
    air: &AirQualityPayload,
    units: UnitSystem,
) -> Result<WeatherView, FetchError> {
    let primary = current
        .weather
        .first()
        .cloned()
        .ok_or_else(|| FetchError::network("current conditions carried no weather entry"))?;

    let offset = format::offset_from_seconds(current.timezone);
    let forecast_offset = format::offset_from_seconds(forecast.city.timezone);

    let conditions = CurrentConditions {
        location_name: current.name,
        description: primary.description.clone(),
        icon: icon_key(&primary.icon),
        temperature: format::floor_temp(current.main.temp),
        feels_like: format::floor_temp(current.main.feels_like),
        humidity_pct: current.main.humidity,
        wind_speed: current.wind.speed,
        wind_direction_deg: current.wind.deg,
        pressure_hpa: current.main.pressure,
        visibility_km: current.visibility.map(format::visibility_km),
        sunrise: format::format_local(current.sys.sunrise, offset, SUN_TIME_FORMAT),
        sunset: format::format_local(current.sys.sunset, offset, SUN_TIME_FORMAT),
        aqi: AqiLevel::from_index(air.index()),
    };

    Ok(WeatherView {
        units,
        current: conditions,
        hourly: derive_hourly(&forecast.list, forecast_offset),
        daily: derive_daily(&forecast.list, forecast_offset),
        condition_code: primary.icon,
    })
}

/// One reading per local calendar day, the one closest to noon, at most five days.
///
/// Days without a reading within half a sampling interval of noon are skipped,
/// so a trailing evening-only day does not show up as a forecast day.
pub fn derive_daily(items: &[ForecastItem], offset: FixedOffset) -> Vec<ForecastEntry> {
    let mut picks: Vec<(chrono::NaiveDate, i64, &ForecastItem, String)> = Vec::new();

    for item in items {
        let Some(local) = format::local_time(item.dt, offset) else {
            continue;
        };

        let distance = (i64::from(local.num_seconds_from_midnight()) - MIDDAY_SECS).abs();
        if distance > MIDDAY_TOLERANCE_SECS {
            continue;
        }

        let date = local.date_naive();
        let label = local.format(DAY_FORMAT).to_string();
        match picks.last_mut() {
            Some(last) if last.0 == date => {
                if distance < last.1 {
                    *last = (date, distance, item, label);
                }
            }
            _ => picks.push((date, distance, item, label)),
        }
    }

    picks
        .into_iter()
        .take(MAX_DAILY_ENTRIES)
        .map(|(_, _, item, date)| {
            let condition = primary_condition(&item.weather);
            ForecastEntry {
                date,
                temperature: format::floor_temp(item.main.temp),
                icon: icon_key(condition.map_or("", |c| c.icon.as_str())),
                condition: condition.map_or_else(String::new, short_label),
            }
        })
        .collect()
}

/// The first eight raw readings (about 24 hours), unfiltered.
pub fn derive_hourly(items: &[ForecastItem], offset: FixedOffset) -> Vec<HourlyEntry> {
    items
        .iter()
        .take(HOURLY_ENTRIES)
        .map(|item| HourlyEntry {
            time: format::format_local(item.dt, offset, HOUR_FORMAT),
            temperature: format::floor_temp(item.main.temp),
            icon: icon_key(primary_condition(&item.weather).map_or("", |c| c.icon.as_str())),
        })
        .collect()
}

fn primary_condition(weather: &[Condition]) -> Option<&Condition> {
    weather.first()
}

fn short_label(condition: &Condition) -> String {
    if condition.main.is_empty() {
        condition.description.clone()
    } else {
        condition.main.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        icons::IconKey,
        model::Coordinates,
        provider::{
            AirQualityItem, AirQualityMain, CurrentMain, ForecastCity, ForecastMain, Sun, Wind,
        },
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    // 2025-10-19 00:00:00 UTC
    const DAY0: i64 = 1_760_832_000;
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn condition(icon: &str, main: &str) -> Condition {
        Condition {
            icon: icon.to_string(),
            description: format!("{main} (detail)"),
            main: main.to_string(),
        }
    }

    fn item(dt: i64, temp: f64, icon: &str) -> ForecastItem {
        ForecastItem {
            dt,
            main: ForecastMain { temp },
            weather: vec![condition(icon, "Clouds")],
        }
    }

    /// Three-hourly readings from `start`, `count` of them.
    fn series(start: i64, count: usize) -> Vec<ForecastItem> {
        (0..count)
            .map(|i| item(start + i as i64 * 3 * HOUR, 20.0 + i as f64 * 0.5, "03d"))
            .collect()
    }

    fn utc() -> FixedOffset {
        format::offset_from_seconds(0)
    }

    fn current_payload(icon: &str) -> CurrentPayload {
        CurrentPayload {
            name: "Pune".into(),
            coord: Coordinates { lat: 18.52, lon: 73.86 },
            main: CurrentMain {
                temp: 28.0,
                feels_like: 30.9,
                humidity: 58,
                pressure: 1008,
            },
            wind: Wind { speed: 4.6, deg: 250 },
            weather: vec![Condition {
                icon: icon.into(),
                description: "light rain".into(),
                main: "Rain".into(),
            }],
            visibility: Some(8_000),
            sys: Sun {
                sunrise: DAY0 + 56 * 60,
                sunset: DAY0 + 12 * HOUR + 39 * 60,
            },
            timezone: 19_800,
        }
    }

    fn air(aqi: Option<i64>) -> AirQualityPayload {
        AirQualityPayload {
            list: vec![AirQualityItem { main: AirQualityMain { aqi } }],
        }
    }

    #[test]
    fn daily_picks_one_midday_reading_per_day() {
        // Five full days sampled every 3 hours starting at midnight UTC.
        let items = series(DAY0, 40);
        let daily = derive_daily(&items, utc());

        assert_eq!(daily.len(), 5);
        let expected_temps: Vec<i64> = (0..5)
            .map(|d| format::floor_temp(20.0 + (d * 8 + 4) as f64 * 0.5))
            .collect();
        let temps: Vec<i64> = daily.iter().map(|d| d.temperature).collect();
        assert_eq!(temps, expected_temps);
        assert_eq!(daily[0].date, "Sun, 19 Oct");
        assert_eq!(daily[4].date, "Thu, 23 Oct");
        assert_eq!(daily[0].condition, "Clouds");
    }

    #[test]
    fn daily_is_capped_at_five_days() {
        let items = series(DAY0, 56);
        assert_eq!(derive_daily(&items, utc()).len(), MAX_DAILY_ENTRIES);
    }

    #[test]
    fn daily_uses_location_offset_for_midday() {
        // UTC+05:30: readings fall on local hh:30, so 11:30 is the closest to noon.
        let offset = format::offset_from_seconds(19_800);
        let items = series(DAY0, 40);
        let daily = derive_daily(&items, offset);

        assert_eq!(daily.len(), 5);
        // 11:30 local is 06:00 UTC, the third reading of each day.
        assert_eq!(daily[0].temperature, format::floor_temp(20.0 + 2.0 * 0.5));
    }

    #[test]
    fn days_without_a_midday_reading_are_skipped() {
        // Starts at 18:00 UTC: the first calendar day has only evening readings.
        let items = series(DAY0 + 18 * HOUR, 10);
        let daily = derive_daily(&items, utc());

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, "Mon, 20 Oct");
    }

    #[test]
    fn hourly_takes_first_eight_unfiltered() {
        let items = series(DAY0 + 5 * DAY, 12);
        let hourly = derive_hourly(&items, utc());

        assert_eq!(hourly.len(), HOURLY_ENTRIES);
        let times: Vec<&str> = hourly.iter().map(|h| h.time.as_str()).collect();
        assert_eq!(
            times,
            ["00:00", "03:00", "06:00", "09:00", "12:00", "15:00", "18:00", "21:00"]
        );
        assert_eq!(hourly[1].temperature, 20);
        assert_eq!(hourly[2].temperature, 21);
    }

    #[test]
    fn hourly_with_short_sequence_returns_everything() {
        let items = series(DAY0, 3);
        assert_eq!(derive_hourly(&items, utc()).len(), 3);
    }

    #[test]
    fn forecast_item_without_conditions_uses_default_icon() {
        let items = vec![ForecastItem {
            dt: DAY0 + 12 * HOUR,
            main: ForecastMain { temp: 10.2 },
            weather: vec![],
        }];

        let daily = derive_daily(&items, utc());
        assert_eq!(daily[0].icon, IconKey::Clear);
        assert_eq!(daily[0].condition, "");
    }

    #[test]
    fn build_view_normalizes_current_conditions() {
        let forecast = ForecastPayload {
            list: series(DAY0, 16),
            city: ForecastCity {
                name: "Pune".into(),
                timezone: 19_800,
            },
        };

        let view = build_view(current_payload("10d"), &forecast, &air(Some(3)), UnitSystem::Metric)
            .expect("view should build");

        assert_eq!(view.current.temperature, 28);
        assert_eq!(view.current.feels_like, 30);
        assert_eq!(view.current.icon, IconKey::Rain);
        assert_eq!(view.current.aqi, AqiLevel::Moderate);
        assert_eq!(view.current.visibility_km, Some(8.0));
        assert_eq!(view.current.sunrise, "06:26 AM");
        assert_eq!(view.current.sunset, "06:09 PM");
        assert_eq!(view.condition_code, "10d");
        assert_eq!(view.hourly.len(), 8);
        assert_eq!(view.hourly[0].time, "05:30");
    }

    #[test]
    fn build_view_without_conditions_is_a_parse_error() {
        let mut current = current_payload("10d");
        current.weather.clear();
        let forecast = ForecastPayload {
            list: vec![],
            city: ForecastCity {
                name: String::new(),
                timezone: 0,
            },
        };

        let err = build_view(current, &forecast, &air(None), UnitSystem::Metric).unwrap_err();
        assert!(matches!(err, FetchError::NetworkOrParse(_)));
    }

    /// Provider double that records calls and can fail individual endpoints.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        calls: Mutex<Vec<&'static str>>,
        current_calls: AtomicUsize,
        fail_air: bool,
        not_found: bool,
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current(
            &self,
            query: &LocationQuery,
            _units: UnitSystem,
        ) -> Result<CurrentPayload, FetchError> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push("current");
            if self.not_found {
                return Err(FetchError::not_found(query.to_string()));
            }
            Ok(current_payload("10d"))
        }

        async fn forecast(
            &self,
            coords: Coordinates,
            _units: UnitSystem,
        ) -> Result<ForecastPayload, FetchError> {
            assert_eq!(coords, Coordinates { lat: 18.52, lon: 73.86 });
            self.calls.lock().unwrap().push("forecast");
            Ok(ForecastPayload {
                list: series(DAY0, 40),
                city: ForecastCity {
                    name: "Pune".into(),
                    timezone: 0,
                },
            })
        }

        async fn air_quality(&self, _coords: Coordinates) -> Result<AirQualityPayload, FetchError> {
            self.calls.lock().unwrap().push("air_quality");
            if self.fail_air {
                return Err(FetchError::network("connection reset"));
            }
            Ok(air(Some(2)))
        }
    }

    #[tokio::test]
    async fn place_lookup_resolves_once_then_fans_out() {
        let provider = ScriptedProvider::default();
        let aggregator = WeatherAggregator::new(Box::new(provider));
        let query = LocationQuery::place("Pune").expect("valid query");

        let view = aggregator
            .fetch_weather(&query, UnitSystem::Metric)
            .await
            .expect("lookup should succeed");

        assert_eq!(view.current.aqi, AqiLevel::Fair);
        assert_eq!(view.daily.len(), 5);
        assert_eq!(view.hourly.len(), 8);
    }

    #[tokio::test]
    async fn current_conditions_are_fetched_exactly_once() {
        let provider = Arc::new(ScriptedProvider::default());
        let aggregator = WeatherAggregator::new(Box::new(provider.clone()));
        let query = LocationQuery::place("Pune").expect("valid query");

        aggregator
            .fetch_weather(&query, UnitSystem::Metric)
            .await
            .expect("lookup should succeed");

        assert_eq!(provider.current_calls.load(Ordering::SeqCst), 1);
        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(calls[0], "current");
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn any_failed_call_fails_the_lookup() {
        let provider = ScriptedProvider {
            fail_air: true,
            ..ScriptedProvider::default()
        };
        let aggregator = WeatherAggregator::new(Box::new(provider));
        let query = LocationQuery::coordinates(18.52, 73.86).expect("valid query");

        let err = aggregator.fetch_weather(&query, UnitSystem::Metric).await.unwrap_err();
        assert!(matches!(err, FetchError::NetworkOrParse(_)));
    }

    #[tokio::test]
    async fn unresolvable_place_is_location_not_found() {
        let provider = Arc::new(ScriptedProvider {
            not_found: true,
            ..ScriptedProvider::default()
        });
        let aggregator = WeatherAggregator::new(Box::new(provider.clone()));
        let query = LocationQuery::place("Atlantis").expect("valid query");

        let err = aggregator.fetch_weather(&query, UnitSystem::Metric).await.unwrap_err();

        assert_eq!(err, FetchError::not_found("Atlantis"));
        assert_eq!(provider.calls.lock().unwrap().as_slice(), ["current"]);
    }
}
