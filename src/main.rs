//! skycast: weather and geocoding from the command line
//!
//! Each subcommand maps to one service operation and prints its response as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use skycast_core::Config;
use skycast_weather::{LocationQuery, ResponseCache, WeatherError, WeatherService, DEFAULT_FORECAST_DAYS};

/// Skycast weather client
#[derive(Parser)]
#[command(name = "skycast")]
#[command(version)]
#[command(about = "Current weather, forecasts and geocoding via Open-Meteo")]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, env = "SKYCAST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Current conditions for a place or coordinates
    Current {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Daily and hourly forecast
    Forecast {
        #[command(flatten)]
        location: LocationArgs,
        /// Number of days (1-10)
        #[arg(short, long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days: i64,
    },

    /// Search locations by name
    Search {
        /// Place name
        q: String,
    },

    /// Nearest named place for coordinates
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

#[derive(clap::Args)]
struct LocationArgs {
    /// Place name, takes precedence over coordinates
    #[arg(short, long)]
    q: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl LocationArgs {
    fn query(&self) -> Result<LocationQuery, WeatherError> {
        LocationQuery::from_parts(self.q.as_deref(), self.lat, self.lon)
    }
}

/// Exit code for a failed operation
fn exit_code(err: &WeatherError) -> u8 {
    match err {
        WeatherError::InvalidRequest(_) => 2,
        WeatherError::LocationNotFound(_) => 3,
        _ => 4,
    }
}

/// Run one subcommand and render its response as pretty JSON.
async fn run(service: &WeatherService, command: Command) -> Result<String> {
    let json = match command {
        Command::Current { location } => {
            let response = service.current_weather(&location.query()?).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Forecast { location, days } => {
            let response = service.forecast(&location.query()?, days).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Search { q } => serde_json::to_string_pretty(&service.search(&q).await?)?,
        Command::Reverse { lat, lon } => {
            serde_json::to_string_pretty(&service.reverse(lat, lon).await?)?
        }
    };
    Ok(json)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    skycast_core::init()?;

    let args = Args::parse();
    let (config, _) = Config::load_validated(args.config.as_deref())?;

    let cache = Arc::new(ResponseCache::new(config.cache.ttl_seconds));
    let service = WeatherService::new(&config, cache)?;

    match run(&service, args.command).await {
        Ok(json) => {
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<WeatherError>() {
            Some(err) => {
                tracing::warn!(error = %err, "Request failed");
                eprintln!("Error: {}", err.user_message());
                Ok(ExitCode::from(exit_code(err)))
            }
            None => Err(e),
        },
    }
}
