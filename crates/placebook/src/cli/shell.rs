//! Line parsing for the interactive shell.
//!
//! One [`App`](crate::App) serves every line typed into the shell, so the
//! cache outlives individual commands: a second `list` sees a populated cache.

use clap::{Parser, Subcommand};

use super::commands::{AddCommand, ListCommand, RemoveCommand, ShowCommand, StatusCommand};

/// One shell input line, parsed as a command.
#[derive(Debug, Parser)]
#[command(multicall = true)]
pub struct ShellLine {
    /// The command on this line
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands accepted at the shell prompt.
#[derive(Debug, Subcommand)]
pub enum ShellCommand {
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

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Error from [`split_line`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unterminated {0} quote")]
pub struct UnterminatedQuote(char);

/// Split a shell line into words.
///
/// Words are separated by whitespace. Single or double quotes group a word
/// that contains spaces; quotes do not nest and have no escapes.
///
/// # Errors
///
/// Returns [`UnterminatedQuote`] if a quote is left open.
pub fn split_line(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(UnterminatedQuote(q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(line: &str) -> ShellCommand {
        ShellLine::try_parse_from(split_line(line).unwrap())
            .unwrap()
            .command
    }

    #[test]
    fn test_shell_line_verify() {
        ShellLine::command().debug_assert();
    }

    #[test]
    fn test_split_line_whitespace() {
        assert_eq!(
            split_line("  list   --format json ").unwrap(),
            vec!["list", "--format", "json"]
        );
        assert!(split_line("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            split_line(r#"add -t "Blue Bottle Cafe" -a 'Mint Plaza, SF'"#).unwrap(),
            vec!["add", "-t", "Blue Bottle Cafe", "-a", "Mint Plaza, SF"]
        );
        assert_eq!(split_line(r#"add -a """#).unwrap(), vec!["add", "-a", ""]);
    }

    #[test]
    fn test_split_line_unterminated_quote() {
        assert_eq!(
            split_line(r#"add -t "Cafe"#),
            Err(UnterminatedQuote('"'))
        );
    }

    #[test]
    fn test_parse_shell_commands() {
        assert!(matches!(parse("list"), ShellCommand::List(_)));
        assert!(matches!(parse("status --json"), ShellCommand::Status(StatusCommand { json: true })));
        assert!(matches!(parse("exit"), ShellCommand::Exit));
        assert!(matches!(parse("quit"), ShellCommand::Exit));

        let ShellCommand::Add(add) = parse(
            r#"add -t "Blue Bottle" -i file:///b.jpg --lat 37.78 --long -122.43"#,
        ) else {
            panic!("expected add command");
        };
        assert_eq!(add.title, "Blue Bottle");
        assert_eq!(add.long, Some(-122.43));

        let ShellCommand::Remove(remove) = parse("remove 4") else {
            panic!("expected remove command");
        };
        assert_eq!(remove.id.get(), 4);
    }

    #[test]
    fn test_parse_rejects_unknown_and_nested_shell() {
        assert!(ShellLine::try_parse_from(["frobnicate"]).is_err());
        assert!(ShellLine::try_parse_from(["shell"]).is_err());
        assert!(ShellLine::try_parse_from(["config", "path"]).is_err());
    }
}
