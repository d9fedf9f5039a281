use std::{fmt, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use citycast_core::{Action, City, Config, IpGeolocator, OpenWeatherClient, Session};
use inquire::{InquireError, Password, Select};
use tracing::info;

use crate::view::{self, Button, Target};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather and a 4-day forecast")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the weather interactively (default).
    Browse,

    /// Print the weather once and exit.
    Show {
        /// One of Zurich, Stockholm, Auckland, Amsterdam; current location if absent.
        #[arg(long)]
        city: Option<City>,
    },

    /// Store the OpenWeather API key and fallback city in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Browse) {
            Command::Browse => browse().await,
            Command::Show { city } => show(city).await,
            Command::Configure => configure(),
        }
    }
}

fn session_from_config() -> anyhow::Result<Session> {
    let config = Config::load()?.with_env();
    let client = OpenWeatherClient::from_config(&config)?;
    let locator = IpGeolocator::new(config.geolocation_url());

    Ok(Session::new(
        Arc::new(client),
        Arc::new(locator),
        config.fallback_city(),
    ))
}

async fn show(city: Option<City>) -> anyhow::Result<()> {
    let mut session = session_from_config()?;
    session.dispatch(city.map_or(Action::Mount, Action::SelectCity));

    let state = session.settle().await;
    if let Some(notice) = &state.notice {
        eprintln!("{}", view::render_alert(notice));
    }
    if let Some(message) = state.error() {
        anyhow::bail!("{message}");
    }

    println!("{}", view::render_weather_box(state, Utc::now()));
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Button(Button),
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Button(button) => write!(f, "{button}"),
            MenuItem::Quit => f.write_str("  Quit"),
        }
    }
}

async fn browse() -> anyhow::Result<()> {
    let mut session = session_from_config()?;
    session.dispatch(Action::Mount);

    loop {
        if session.state().is_loading() {
            println!("{}", view::LOADING);
            session.settle().await;
        }

        let state = session.state();
        let alerts: Vec<String> = state
            .notice
            .iter()
            .cloned()
            .chain(state.error().map(str::to_owned))
            .collect();
        if !alerts.is_empty() {
            for message in &alerts {
                println!("{}", view::render_alert(message));
            }
            if !acknowledge()? {
                break;
            }
            session.dispatch(Action::Acknowledge);
        }

        let state = session.state();
        println!("\n{}", view::render_weather_box(state, Utc::now()));

        let buttons = view::button_row(state);
        let cursor = buttons.iter().position(|b| b.active).unwrap_or(0);
        let mut items: Vec<MenuItem> = buttons.into_iter().map(MenuItem::Button).collect();
        items.push(MenuItem::Quit);

        let choice = match Select::new("Show weather for:", items)
            .with_starting_cursor(cursor)
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read selection"),
        };

        match choice {
            MenuItem::Quit => break,
            MenuItem::Button(Button { target, .. }) => {
                info!(?target, "selected");
                session.dispatch(match target {
                    Target::CurrentLocation => Action::UseCurrentLocation,
                    Target::City(city) => Action::SelectCity(city),
                });
            }
        }
    }

    Ok(())
}

/// Blocks on a single "OK" choice. Returns false if the user bailed out.
fn acknowledge() -> anyhow::Result<bool> {
    match Select::new("", vec!["OK"]).prompt() {
        Ok(_) => Ok(true),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(err) => Err(err).context("Failed to read acknowledgement"),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let fallback = Select::new(
        "City to show when your location can't be determined:",
        City::all().to_vec(),
    )
    .prompt()
    .context("Failed to read fallback city")?;
    config.fallback_city = Some(fallback);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
