//! `placebook` - CLI for managing favorite places
//!
//! This binary opens the local place store, keeps the in-memory cache in step
//! with it, and renders places as plain text, tables, or JSON.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use placebook::cli::{
    split_line, AddCommand, Cli, Command, ConfigCommand, OutputFormat, ShellCommand, ShellLine,
};
use placebook::{init_logging, App, Config, Coordinates, CreateOutcome, Place, PlaceId, SyncState};

const EMPTY_LIST_MESSAGE: &str = "No places added yet. Please start adding places!";

const SHELL_PROMPT: &str = "placebook> ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // `config` commands must work even when the file is broken
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(cli.config, config_cmd),
        command => command,
    };

    let config = Config::load_from(cli.config).context("loading configuration")?;
    let app = App::start(config);

    let result = match command {
        Command::List(cmd) => handle_list(&app, cmd.format),
        Command::Add(cmd) => handle_add(&app, cmd).await,
        Command::Show(cmd) => handle_show(&app, cmd.id, cmd.json),
        Command::Remove(cmd) => handle_remove(&app, cmd.id),
        Command::Status(cmd) => handle_status(&app, cmd.json),
        Command::Shell => handle_shell(&app).await,
        Command::Config(_) => Ok(()),
    };

    app.close().context("closing place store")?;
    result
}

fn handle_list(app: &App, format: OutputFormat) -> anyhow::Result<()> {
    let activation = app.list()?;
    let places = &activation.displayed;

    if activation.prior_state == SyncState::Populated
        && activation.fresh.as_ref().is_some_and(|fresh| fresh != places)
    {
        info!("Showing cached places; store changes will show on the next listing");
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(places)?),
        _ if places.is_empty() => println!("{EMPTY_LIST_MESSAGE}"),
        OutputFormat::Plain => {
            for place in places {
                println!("{}", format_place_line(place));
            }
        }
        OutputFormat::Table => print_table(places),
    }
    Ok(())
}

async fn handle_add(app: &App, cmd: AddCommand) -> anyhow::Result<()> {
    let picked = match (cmd.lat, cmd.long) {
        (Some(lat), Some(long)) => Some(Coordinates::new(lat, long)),
        _ => None,
    };

    match app.add(cmd.title, cmd.image, picked, cmd.address).await? {
        CreateOutcome::Saved(place) => {
            println!("Saved place {}: {}", place.id(), place.title);
            println!("  {}", place.location.address);
        }
        CreateOutcome::NotSaved => println!("Place was not saved."),
    }
    Ok(())
}

fn handle_show(app: &App, id: PlaceId, json: bool) -> anyhow::Result<()> {
    let place = app.show(id)?;
    let preview_url = app.preview_url(&place);

    if json {
        let value = serde_json::json!({
            "place": place,
            "mapPreviewUrl": preview_url,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", place.title);
        println!("{}", "-".repeat(place.title.chars().count()));
        println!("Id:       {}", place.id());
        println!("Image:    {}", place.image_uri);
        println!("Address:  {}", place.location.address);
        println!("Location: {}", place.location.coordinates());
        println!("Map:      {preview_url}");
    }
    Ok(())
}

fn handle_remove(app: &App, id: PlaceId) -> anyhow::Result<()> {
    app.remove(id)?;
    println!("Removed place {id}");
    Ok(())
}

fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let status = app.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("placebook status");
        println!("----------------");
        println!("Database:       {}", status.database_path.display());
        println!(
            "Store:          {}",
            if status.store_available {
                "available"
            } else {
                "unavailable"
            }
        );
        if let Some(count) = status.stored_places {
            println!("Stored places:  {count}");
        }
        println!("Cache:          {}", status.cache_state);
        println!("Failure policy: {:?}", status.failure_policy);
        println!(
            "Geocoding:      {}",
            if status.geocoding { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}

async fn handle_shell(app: &App) -> anyhow::Result<()> {
    let mut changes = app.sync().cache().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{SHELL_PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let words = match split_line(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };

        let result = match command {
            ShellCommand::List(cmd) => handle_list(app, cmd.format),
            ShellCommand::Add(cmd) => handle_add(app, cmd).await,
            ShellCommand::Show(cmd) => handle_show(app, cmd.id, cmd.json),
            ShellCommand::Remove(cmd) => handle_remove(app, cmd.id),
            ShellCommand::Status(cmd) => handle_status(app, cmd.json),
            ShellCommand::Exit => break,
        };
        if let Err(err) = result {
            eprintln!("Error: {err:#}");
        }

        if changes.has_changed().unwrap_or(false) {
            debug!(
                "Cache changed; now holds {} places",
                changes.borrow_and_update().places.len()
            );
        }
    }
    Ok(())
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Sync]");
                println!("  Failure policy: {:?}", config.sync.failure_policy);
                println!();
                println!("[Maps]");
                println!(
                    "  API key:        {}",
                    if config.has_api_key() { "set" } else { "not set" }
                );
                println!("  Zoom:           {}", config.maps.zoom);
                println!(
                    "  Preview size:   {}x{}",
                    config.maps.preview_width, config.maps.preview_height
                );
                println!("  Map type:       {}", config.maps.map_type);
                println!("  Timeout (s):    {}", config.maps.request_timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                config_path
                    .unwrap_or_else(Config::default_config_path)
                    .display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn format_place_line(place: &Place) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        place.id(),
        place.title,
        place.location.address,
        place.image_uri
    )
}

fn print_table(places: &[Place]) {
    let title_width = places
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("TITLE".len());
    let id_width = places
        .iter()
        .map(|p| p.id().to_string().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    println!("{:<id_width$}  {:<title_width$}  ADDRESS", "ID", "TITLE");
    for place in places {
        println!(
            "{:<id_width$}  {:<title_width$}  {}",
            place.id().to_string(),
            place.title,
            place.location.address
        );
    }
}
