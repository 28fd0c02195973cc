use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Text};
use skyfind_core::{
    Config, SearchOrchestrator, SearchOutcome,
    codes::{DESCRIPTIONS, icon_for},
};
use std::{path::PathBuf, process::ExitCode};

use crate::view::{OutputFormat, TerminalView};

/// Typed at the interactive prompt to leave.
const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyfind", version, about = "Current weather for a city")]
pub struct Cli {
    /// Read and write configuration at this path instead of the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        /// City name; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Prompt for city names and search on every Enter.
    Interactive,

    /// Interactively edit the configuration file.
    Configure,

    /// List the known WMO weather codes with their descriptions and icons.
    Codes,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        match &self.command {
            Command::Show { city } => {
                let orchestrator = self.orchestrator(format)?;
                let outcome = orchestrator.search(&city.join(" ")).await;

                Ok(match outcome {
                    SearchOutcome::Failed(_) => ExitCode::FAILURE,
                    _ => ExitCode::SUCCESS,
                })
            }
            Command::Interactive => {
                let orchestrator = self.orchestrator(format)?;
                interactive(&orchestrator).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Configure => {
                self.configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Codes => {
                print_codes(format);
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    fn orchestrator(&self, format: OutputFormat) -> Result<SearchOrchestrator<TerminalView>> {
        let config = self.load_config()?;
        tracing::debug!(?config, "Loaded configuration");

        SearchOrchestrator::from_config(&config, TerminalView::new(format))
            .context("Failed to set up the HTTP client")
    }

    fn configure(&self) -> Result<()> {
        let current = self.load_config()?;

        let geocoding_url = Text::new("Geocoding endpoint:")
            .with_default(&current.geocoding_url)
            .prompt()?;
        let forecast_url = Text::new("Forecast endpoint:")
            .with_default(&current.forecast_url)
            .prompt()?;
        let language = Text::new("Place name language:")
            .with_default(&current.language)
            .prompt()?;
        let icon_base_url = Text::new("Icon base URL:")
            .with_default(&current.icon_base_url)
            .prompt()?;

        let timeout_default = current.timeout_secs.map(|s| s.to_string()).unwrap_or_default();
        let timeout = Text::new("Request timeout in seconds:")
            .with_default(&timeout_default)
            .with_help_message("leave empty to wait indefinitely")
            .prompt()?;

        let config = Config {
            geocoding_url,
            forecast_url,
            language,
            icon_base_url,
            timeout_secs: parse_timeout(&timeout)?,
        };

        let path = match &self.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };

        println!("Configuration saved to {}", path.display());
        Ok(())
    }
}

async fn interactive(orchestrator: &SearchOrchestrator<TerminalView>) -> Result<()> {
    loop {
        let input = Text::new("City:")
            .with_help_message("Enter to search, Esc or :q to quit")
            .prompt();

        match input {
            Ok(city) if city.trim() == QUIT => break,
            Ok(city) => {
                orchestrator.search(&city).await;
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city from prompt"),
        }
    }

    Ok(())
}

fn parse_timeout(raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse()
        .map(Some)
        .with_context(|| format!("Invalid timeout '{raw}': expected a whole number of seconds"))
}

fn print_codes(format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            for (code, text) in DESCRIPTIONS {
                let icon = icon_for(*code);
                println!("{code:>3}  {text:<32} {}", icon.asset());
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = DESCRIPTIONS
                .iter()
                .map(|(code, text)| {
                    serde_json::json!({
                        "code": code,
                        "description": text,
                        "icon": icon_for(*code),
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(rows));
        }
    }
}
