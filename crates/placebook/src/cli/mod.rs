//! Command-line interface for placebook.
//!
//! This module provides the CLI structure for the `placebook` binary and the
//! line parser for its interactive shell.

mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ListCommand, OutputFormat, RemoveCommand, ShowCommand,
    StatusCommand,
};
pub use shell::{split_line, ShellCommand, ShellLine, UnterminatedQuote};

/// placebook - Keep a list of your favorite places
///
/// Each place has a title, a photo, and a picked location with its address.
/// Places are stored in a local database and survive restarts.
#[derive(Debug, Parser)]
#[command(name = "placebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all favorite places
    List(ListCommand),

    /// Add a favorite place
    Add(AddCommand),

    /// Show one place with its map preview
    Show(ShowCommand),

    /// Remove a place
    Remove(RemoveCommand),

    /// Show store and cache status
    Status(StatusCommand),

    /// Run commands interactively against one long-lived cache
    Shell,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "placebook");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["placebook", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List(ListCommand {
                format: OutputFormat::Table
            })
        ));

        let cli = Cli::try_parse_from(["placebook", "list", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List(ListCommand {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_add_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "placebook",
            "add",
            "--title",
            "Cafe",
            "--image",
            "file:///a.jpg",
            "--lat",
            "37.78",
            "--long",
            "-122.43",
        ])
        .unwrap();

        let Command::Add(add) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(add.title, "Cafe");
        assert_eq!(add.lat, Some(37.78));
        assert_eq!(add.long, Some(-122.43));
        assert!(add.address.is_none());
    }

    #[test]
    fn test_parse_add_without_location() {
        let cli =
            Cli::try_parse_from(["placebook", "add", "-t", "Cafe", "-i", "file:///a.jpg"]).unwrap();
        let Command::Add(add) = cli.command else {
            panic!("expected add command");
        };
        assert!(add.lat.is_none());
        assert!(add.long.is_none());
    }

    #[test]
    fn test_parse_add_lat_requires_long() {
        let result = Cli::try_parse_from([
            "placebook",
            "add",
            "-t",
            "Cafe",
            "-i",
            "file:///a.jpg",
            "--lat",
            "1.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_add_requires_title() {
        assert!(Cli::try_parse_from(["placebook", "add", "-i", "file:///a.jpg"]).is_err());
    }

    #[test]
    fn test_parse_show_and_remove() {
        let cli = Cli::try_parse_from(["placebook", "show", "7", "--json"]).unwrap();
        let Command::Show(show) = cli.command else {
            panic!("expected show command");
        };
        assert_eq!(show.id.get(), 7);
        assert!(show.json);

        let cli = Cli::try_parse_from(["placebook", "remove", "3"]).unwrap();
        let Command::Remove(remove) = cli.command else {
            panic!("expected remove command");
        };
        assert_eq!(remove.id.get(), 3);
    }

    #[test]
    fn test_parse_shell() {
        let cli = Cli::try_parse_from(["placebook", "shell"]).unwrap();
        assert!(matches!(cli.command, Command::Shell));
    }

    #[test]
    fn test_parse_invalid_id() {
        assert!(Cli::try_parse_from(["placebook", "show", "abc"]).is_err());
    }

    #[test]
    fn test_parse_config_subcommands() {
        let cli = Cli::try_parse_from(["placebook", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));

        let cli =
            Cli::try_parse_from(["placebook", "config", "validate", "-f", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["placebook", "-c", "/custom/config.toml", "-v", "status"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 1);

        let cli = Cli::try_parse_from(["placebook", "status", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
