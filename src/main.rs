use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;

use agrobot::application::errors::AppError;
use agrobot::domain::entities::{FarmInput, Language};
use agrobot::infrastructure::config::Config;
use agrobot::infrastructure::http::{load_predictor, AppState, Server};
use agrobot::infrastructure::weather::WeatherClient;

#[derive(Parser)]
#[command(name = "agrobot")]
#[command(about = "Multilingual farming assistant API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep sessions in memory instead of SQLite
        #[arg(long)]
        memory: bool,
    },
    /// Print a yield prediction as JSON
    Predict {
        crop: String,
        soil: String,
        season: String,
        location: String,

        #[arg(long)]
        rainfall: Option<f64>,

        /// Irrigated share of the farm, 0-100
        #[arg(long)]
        irrigation: Option<f64>,

        /// kg/ha
        #[arg(long)]
        fertilizer: Option<f64>,

        /// °C
        #[arg(long)]
        temperature: Option<f64>,

        #[arg(long)]
        area: Option<f64>,
    },
    /// Print a weather advisory as JSON
    Weather {
        location: String,

        /// en, hi or te
        #[arg(short, long, default_value = "en")]
        language: String,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, memory } => serve(&cli.config, port, memory),
        Commands::Predict {
            crop,
            soil,
            season,
            location,
            rainfall,
            irrigation,
            fertilizer,
            temperature,
            area,
        } => {
            let input = FarmInput {
                rainfall_mm: rainfall,
                irrigation_percent: irrigation,
                fertilizer_kg_ha: fertilizer,
                temperature_c: temperature,
                area_hectares: area,
                ..FarmInput::new(crop, soil, season, location)
            };
            predict(&cli.config, &input)
        }
        Commands::Weather { location, language } => weather(&cli.config, &location, &language),
        Commands::Version => {
            println!("agrobot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// File config when present, environment on top either way
fn load_config(config_path: &str) -> Result<Config, AppError> {
    let config = if Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()?
            }
        }
    } else {
        Config::load_env()?
    };
    config.validate()?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Internal(format!("Failed to start runtime: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn serve(config_path: &str, port: Option<u16>, memory: bool) -> Result<(), AppError> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if memory {
        config.database.in_memory = true;
    }

    tracing::info!("Starting agrobot v{}", env!("CARGO_PKG_VERSION"));

    let rt = runtime()?;
    rt.block_on(async {
        let state = AppState::from_config(&config)?;
        Server::new(state, config.bind_address()).run().await
    })
}

fn predict(config_path: &str, input: &FarmInput) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    input.validate()?;
    let predictor = load_predictor(&config)?;
    print_json(&predictor.predict(input))
}

fn weather(config_path: &str, location: &str, language: &str) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    let language = Language::from_code(language).unwrap_or_default();
    let client = WeatherClient::new(&config.weather.base_url, config.weather.timeout());

    let rt = runtime()?;
    let advisory = rt.block_on(client.advisory(location, language));
    print_json(&advisory)
}

fn init_config() -> Result<(), AppError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
