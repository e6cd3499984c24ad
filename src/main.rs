use std::path::PathBuf;

use agri_advisor::{AgriChatbot, Role};
use agri_context::{ClimateContext, Coordinates, NasaPowerClient};
use agri_core::{AppError, Config};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Terminal front-end for the agricultural advice chat
#[derive(Debug, Parser)]
#[command(name = "agrichat", version, about)]
struct Cli {
    /// Latitude in decimal degrees
    #[arg(long, env = "AGRICHAT_LATITUDE", allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, env = "AGRICHAT_LONGITUDE", allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// JSON file with climate data to include in every prompt
    #[arg(long, conflicts_with = "fetch_climate")]
    climate_file: Option<PathBuf>,

    /// Fetch recent daily climate data from NASA POWER for the coordinates
    #[arg(long, requires = "lat")]
    fetch_climate: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    agri_core::init()?;

    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    let bot = AgriChatbot::new(&config)?;

    let coords = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };

    if let Some(coords) = coords {
        // Not awaited: the first question may go out before the place is known.
        let _ = bot.set_coordinates(coords);
    }

    if let Some(climate) = load_climate(&cli, &config, coords).await {
        bot.set_climate(climate);
    }

    println!("Agricultural Assistant");
    println!("Ask about agriculture... (/history, /location, /quit)");

    run_repl(&bot).await
}

/// Climate data is optional; failures are reported and the chat continues without it.
async fn load_climate(
    cli: &Cli,
    config: &Config,
    coords: Option<Coordinates>,
) -> Option<ClimateContext> {
    let result = if let Some(path) = &cli.climate_file {
        ClimateContext::from_json_file(path)
    } else if let (true, Some(coords)) = (cli.fetch_climate, coords) {
        let today = chrono::Local::now().date_naive();
        match NasaPowerClient::new(&config.climate, &config.http) {
            Ok(client) => client.fetch_recent(coords, today).await,
            Err(e) => Err(e),
        }
    } else {
        return None;
    };

    match result {
        Ok(climate) => Some(climate),
        Err(e) => {
            tracing::warn!("Climate data unavailable: {}", e);
            eprintln!("{}", AppError::from(e).user_message());
            None
        }
    }
}

async fn run_repl(bot: &AgriChatbot) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                for message in bot.transcript() {
                    let who = match message.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    println!("{}: {}", who, message.content);
                }
            }
            "/location" => match (bot.coordinates(), bot.location()) {
                (Some(c), Some(info)) => {
                    println!("{}, {} ({})", c.latitude, c.longitude, info.describe())
                }
                (Some(c), None) => println!("{}, {} (not resolved yet)", c.latitude, c.longitude),
                (None, _) => println!("No coordinates set"),
            },
            _ => {
                bot.set_input(line.clone());
                if let Some(outcome) = bot.submit_input().await {
                    println!("assistant: {}", outcome.text());
                }
            }
        }
    }

    tracing::info!("AgriChat exiting after {} messages", bot.transcript().len());
    Ok(())
}
