use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use weather_core::{
    Config, DashboardController, FileStore, LocationQuery, LookupState, RecentSearchesStore,
    UnitSystem, WeatherAggregator, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    /// Log lookups and provider calls to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and dashboard defaults.
    Configure,

    /// Show the dashboard for a city or a coordinate pair.
    Show {
        /// City name; when omitted (and no coordinates), the configured default city.
        city: Option<String>,

        /// Latitude, used together with --lon instead of a city.
        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude, used together with --lat.
        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Override the configured unit system.
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// List recent searches, most recent first.
    Recent,

    /// Interactive dashboard: search repeatedly, toggle units.
    Dashboard {
        #[arg(long)]
        units: Option<UnitSystem>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                units,
            } => show(city, lat.zip(lon), units).await,
            Command::Recent => {
                let store = RecentSearchesStore::load(Box::new(FileStore::in_data_dir()?));
                if store.entries().is_empty() {
                    println!("No recent searches.");
                }
                for (i, name) in store.entries().iter().enumerate() {
                    println!("{}. {name}", i + 1);
                }
                Ok(())
            }
            Command::Dashboard { units } => dashboard(units).await,
        }
    }
}

fn build_controller(
    config: &Config,
    units: Option<UnitSystem>,
) -> anyhow::Result<DashboardController> {
    let provider = provider_from_config(config)?;
    let store = FileStore::in_data_dir()?;

    Ok(DashboardController::new(
        WeatherAggregator::new(provider),
        RecentSearchesStore::load(Box::new(store)),
        units.unwrap_or(config.units),
    ))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let start = match config.units {
        UnitSystem::Metric => 0,
        UnitSystem::Imperial => 1,
    };
    config.units = Select::new("Units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit system")?;

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    let city = LocationQuery::place(&city).context("Default city must not be blank")?;
    config.default_city = city.to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    city: Option<String>,
    coords: Option<(f64, f64)>,
    units: Option<UnitSystem>,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(
        units = %config.units,
        default_city = %config.default_city,
        "Configuration loaded"
    );
    let mut controller = build_controller(&config, units)?;

    let state = match (city, coords) {
        (Some(city), _) => controller.search(&city).await,
        (None, Some((lat, lon))) => controller.locate(lat, lon).await,
        (None, None) => {
            let query = LocationQuery::place(&config.default_city)?;
            controller.show(query).await
        }
    };

    match state {
        LookupState::Failed(err) => bail!("{}", err.user_message()),
        state => {
            println!("{}", render::render_state(state));
            Ok(())
        }
    }
}

async fn dashboard(units: Option<UnitSystem>) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(
        units = %config.units,
        default_city = %config.default_city,
        "Configuration loaded"
    );
    let mut controller = build_controller(&config, units)?;

    let query = LocationQuery::place(&config.default_city)?;
    println!("{}", render::render_state(controller.show(query).await));

    loop {
        let help = render::prompt_help(controller.recent(), controller.units());
        let input = match Text::new("Search city:").with_help_message(&help).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                tracing::debug!("Search prompt cancelled, leaving dashboard");
                break;
            }
            Err(err) => return Err(err).context("Failed to read search"),
        };

        let state = match input.trim() {
            ":q" => break,
            ":u" => controller.toggle_units().await,
            text => controller.search(text).await,
        };
        println!("{}", render::render_state(state));
    }

    Ok(())
}
