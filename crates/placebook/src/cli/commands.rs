//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::place::PlaceId;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
///
/// `--lat`/`--long` stand in for a map pick. Without `--address` the address
/// is looked up through the geocoding service.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Title of the place
    #[arg(short, long)]
    pub title: String,

    /// URI of the photo taken at the place
    #[arg(short, long, value_name = "URI")]
    pub image: String,

    /// Latitude of the picked location
    #[arg(long, requires = "long", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the picked location
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub long: Option<f64>,

    /// Address to use instead of reverse geocoding
    #[arg(short, long)]
    pub address: Option<String>,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the place
    pub id: PlaceId,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Id of the place
    pub id: PlaceId,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per place
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON output
    Json,
}
