//! `vidjot` - CLI for the vidjot web application
//!
//! Runs the web server and offers commands for inspecting stored ideas and
//! configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use vidjot::cli::{Cli, Command, ConfigCommand, IdeasCommand, OutputFormat, ServeCommand};
use vidjot::{init_logging, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(cli.config, &serve_cmd).await,
        Command::Ideas(ideas_cmd) => handle_ideas(&load_config(cli.config)?, &ideas_cmd),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<std::path::PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("could not load configuration")
}

async fn handle_serve(
    config_path: Option<std::path::PathBuf>,
    cmd: &ServeCommand,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    cmd.apply(&mut config);
    config.validate()?;

    vidjot::web::serve(&config)
        .await
        .context("web server failed")
}

fn handle_ideas(config: &Config, cmd: &IdeasCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        IdeasCommand::List { format } => {
            let ideas = storage.list()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ideas)?),
                OutputFormat::Plain => {
                    if ideas.is_empty() {
                        println!("No video ideas listed");
                    }
                    for idea in &ideas {
                        println!(
                            "{}  {}  {}",
                            idea.date.format("%Y-%m-%d %H:%M"),
                            idea.id.as_deref().unwrap_or_default(),
                            idea.title
                        );
                        println!("    {}", idea.details);
                    }
                }
            }
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
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}", config.bind_addr());
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!("  Cookie name:        {}", config.session.cookie_name);
                println!(
                    "  Idle timeout (min): {}",
                    config.session.idle_timeout_minutes
                );
                println!("  Secure cookie:      {}", config.session.secure_cookie);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
