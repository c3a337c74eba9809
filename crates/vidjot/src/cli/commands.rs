//! Arguments for each `vidjot` subcommand.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::Config;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Apply command-line overrides to a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Idea inspection commands.
#[derive(Debug, Subcommand)]
pub enum IdeasCommand {
    /// List stored ideas, newest first
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// `vidjot config ...`
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration
    Show {
        /// Print as JSON instead of a summary
        #[arg(short, long)]
        json: bool,
    },

    /// Print where the configuration file is looked up
    Path,

    /// Load a configuration file and check its values
    Validate {
        /// File to check (defaults to the active configuration file)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// How `ideas list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One block per idea, for people
    #[default]
    Plain,
    /// A JSON array of ideas
    Json,
}
