use anyhow::anyhow;
use chrono::{Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ForecastViewModel, Selection, TimeOfDay, UnitSystem, ViewState,
    model::parse_weekday, provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Select, Text};

use crate::{browse, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weekday weather forecast viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, unit system and default location.
    Configure,

    /// Show the forecast for a weekday and the same weekday one week later.
    Show {
        /// Location, e.g. "Manhattan" or "Lisbon, Portugal". Defaults to the configured location.
        location: Option<String>,

        /// Weekday to look at, e.g. "friday" or "fri".
        #[arg(long, short, default_value = "friday", value_parser = weekday_arg)]
        day: Weekday,

        /// Part of the day to chart: morning, afternoon or evening.
        #[arg(long, short, default_value = "morning", value_parser = time_of_day_arg)]
        time: TimeOfDay,

        /// How many weeks past the nearest matching weekday (0-30).
        #[arg(long, short, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=30))]
        week: u32,

        /// Override the configured unit system (us or metric).
        #[arg(long, value_parser = unit_system_arg)]
        units: Option<UnitSystem>,
    },

    /// Browse interactively: change day, period, week and location.
    Browse {
        /// Starting location. Defaults to the configured location.
        location: Option<String>,

        /// Override the configured unit system (us or metric).
        #[arg(long, value_parser = unit_system_arg)]
        units: Option<UnitSystem>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                location,
                day,
                time,
                week,
                units,
            } => {
                let config = load_config(units)?;
                let selection = Selection {
                    location: config.location_or_default(location),
                    weekday: day,
                    time_of_day: time,
                    week_offset: week,
                };
                show(&config, selection).await
            }
            Command::Browse { location, units } => {
                let config = load_config(units)?;
                let location = config.location_or_default(location);
                browse::run(&config, location).await
            }
        }
    }
}

/// Local calendar date used for one fetch cycle.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn load_config(units: Option<UnitSystem>) -> anyhow::Result<Config> {
    let mut config = Config::resolve()?;
    if let Some(units) = units {
        config.unit_system = units;
    }
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Visual Crossing API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let units = UnitSystem::all().to_vec();
    let cursor = units
        .iter()
        .position(|u| *u == config.unit_system)
        .unwrap_or_default();
    let unit_system = Select::new("Unit system:", units)
        .with_starting_cursor(cursor)
        .prompt()?;

    let current_location = config.location_or_default(None);
    let location = Text::new("Default location:")
        .with_default(&current_location)
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.unit_system = unit_system;
    config.default_location = Some(location.trim().to_string()).filter(|l| !l.is_empty());

    config.save()?;

    let path = Config::config_file_path()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

async fn show(config: &Config, selection: Selection) -> anyhow::Result<()> {
    let gateway = provider_from_config(config)?;
    let mut vm = ForecastViewModel::new(selection);
    let mut slots = render::ChartSlots::new();

    if let Some(ticket) = vm.mount(today()) {
        vm.drive(gateway.as_ref(), ticket).await;
    }

    print!("{}", render::view(&vm, &mut slots));
    outcome(&vm)
}

/// Exit status for `show`. The failure details are already in the rendered view.
fn outcome(vm: &ForecastViewModel) -> anyhow::Result<()> {
    if vm.state() == ViewState::Failed {
        return Err(anyhow!("no forecast shown for {}", vm.selection().location));
    }
    Ok(())
}

fn weekday_arg(value: &str) -> Result<Weekday, String> {
    parse_weekday(value).map_err(|e| e.to_string())
}

fn time_of_day_arg(value: &str) -> Result<TimeOfDay, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn unit_system_arg(value: &str) -> Result<UnitSystem, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}
