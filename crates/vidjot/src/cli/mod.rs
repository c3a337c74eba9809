//! The `vidjot` command line: `serve`, plus read-only `ideas` and `config`
//! commands for poking at a deployment.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, IdeasCommand, OutputFormat, ServeCommand};

/// vidjot - Jot down your video ideas
///
/// Runs a small web application for collecting video ideas, and offers a
/// few commands for inspecting its data and configuration.
#[derive(Debug, Parser)]
#[command(name = "vidjot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Read settings from FILE instead of the default location
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output; repeat for request traces
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Inspect stored ideas
    #[command(subcommand)]
    Ideas(IdeasCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Log level picked by `-q` and `-v`.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "vidjot");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["vidjot", "-q", "serve"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["vidjot", "serve"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["vidjot", "-v", "serve"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["vidjot", "-vv", "serve"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = parse(&["vidjot", "serve", "--host", "0.0.0.0", "-p", "8080"]);
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.port, Some(8080));
                assert_eq!(cmd.host, Some("0.0.0.0".parse().unwrap()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ideas_list_json() {
        let cli = parse(&["vidjot", "ideas", "list", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Command::Ideas(IdeasCommand::List {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["vidjot", "config", "validate", "-f", "/tmp/x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["vidjot", "-c", "/custom/config.toml", "config", "path"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        assert!(Cli::try_parse_from(["vidjot", "serve", "--port", "99999"]).is_err());
    }
}
