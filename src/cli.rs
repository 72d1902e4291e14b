use crate::config::Config;
use crate::feed::{Dispatcher, Feed, Outcome};
use crate::logging::{setup_logging, LogLevel};
use crate::report::{self, Item};
use crate::summary::Summary;
use crate::table;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode, Select};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

fn default(path: &Path) -> String {
    format!("[default: {}]", path.as_os_str().to_string_lossy())
}

/// Japanese earthquake early warning tool
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long = "config", value_name = "FILE", help = default(&Config::default_path()))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    /// [default: warn]
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<LogLevel>,

    /// EEW endpoint (overrides config)
    #[arg(short, long, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    #[serde(skip)]
    format: OutputFormat,

    /// Format string used by the summary output e.g. "{event_id} M{magnitude}"
    #[arg(long = "fstring", value_name = "STRING")]
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_fstring: Option<String>,

    #[command(subcommand)]
    #[serde(skip)]
    command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Summary,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save your dmdata.jp API key in the config file
    Init,
    /// Fetch the latest reports once and print them
    Fetch,
    /// Fetch on demand from a menu
    Interactive,
    /// Fetch repeatedly at the configured poll interval
    Watch,
    /// Print reports from a saved JSON response
    Decode {
        /// Path to the saved response
        file: PathBuf,
    },
    /// Open the config file in your editor
    EditConfig,
}

pub fn cli() -> Result<()> {
    let args = Cli::parse();

    let mut config = Config::from_cli(&args)?;
    if let Some(level) = args.log_level {
        config.main.logging.console_level = level;
        config.main.logging.file_level = level;
    }
    let _guard = setup_logging(&config.main.logging);
    debug!("Command line arguments: {:#?}", &args);
    debug!("Config path: {}", config.config_path.display());

    let fstring = config.main.summary_fstring.clone();
    let printer = Printer {
        format: args.format,
        fstring: &fstring,
    };

    match &args.command {
        Some(Commands::Init) => init(&mut config)?,
        Some(Commands::Fetch) | None => fetch(&config, &printer)?,
        Some(Commands::Interactive) => interactive(&config, &printer)?,
        Some(Commands::Watch) => watch(&config, &printer)?,
        Some(Commands::Decode { file }) => decode(file, &printer)?,
        Some(Commands::EditConfig) => edit_config(&config)?,
    }
    Ok(())
}

struct Printer<'a> {
    format: OutputFormat,
    fstring: &'a str,
}

impl Printer<'_> {
    fn print(&self, items: &[Item]) -> Result<()> {
        match self.format {
            OutputFormat::Table => println!("{}", table::render(items)),
            OutputFormat::Summary => {
                for item in items {
                    println!("{}", Summary::new(item).process_fstring(self.fstring)?);
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        }
        Ok(())
    }

    fn print_feed(&self, feed: &Feed) -> Result<()> {
        if let Some(updated_at) = feed.updated_at() {
            info!("Last updated {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
        }
        self.print(feed.items())
    }
}

fn init(config: &mut Config) -> Result<()> {
    let key = Password::new("Enter your dmdata.jp API key")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(&key)?;
    println!("Saved API key to {}", config.config_path.display());
    Ok(())
}

fn fetch(config: &Config, printer: &Printer) -> Result<()> {
    let dispatcher = Dispatcher::new(config.get_client());
    let mut feed = Feed::new();
    match dispatcher.fetch_into(&mut feed) {
        Outcome::Updated(_) => printer.print_feed(&feed),
        Outcome::Failed(reason) => Err(anyhow!(reason)),
        Outcome::Stale => Err(anyhow!("Fetch was superseded")),
    }
}

const FETCH: &str = "Fetch earthquake information";
const QUIT: &str = "Quit";

fn interactive(config: &Config, printer: &Printer) -> Result<()> {
    let dispatcher = Dispatcher::new(config.get_client());
    let mut feed = Feed::new();
    loop {
        let choice = match Select::new("EEW Buddy", vec![FETCH, QUIT]).prompt() {
            Ok(choice) => choice,
            Err(err) => {
                debug!("Prompt closed: {err}");
                return Ok(());
            }
        };
        if choice == QUIT {
            return Ok(());
        }
        match dispatcher.fetch_into(&mut feed) {
            Outcome::Updated(_) => printer.print_feed(&feed)?,
            Outcome::Failed(reason) => {
                error!("{reason}");
                // Keep showing what we had
                printer.print_feed(&feed)?;
            }
            Outcome::Stale => {}
        }
    }
}

fn watch(config: &Config, printer: &Printer) -> Result<()> {
    let dispatcher = Dispatcher::new(config.get_client());
    let mut feed = Feed::new();
    let interval = config.main.poll_interval;
    info!("Fetching every {} seconds", interval.as_secs());

    dispatcher.watch(&mut feed, interval, None, |feed, outcome| {
        match outcome {
            Outcome::Updated(_) => printer.print_feed(feed)?,
            Outcome::Failed(reason) => error!("{reason}"),
            Outcome::Stale => {}
        }
        Ok(())
    })
}

fn decode(path: &Path, printer: &Printer) -> Result<()> {
    let body = fs::read_to_string(path)?;
    let response = report::decode(&body)?;
    info!(
        "{} reports in response {} from {}",
        response.items.len(),
        response.response_id,
        response.response_time
    );
    printer.print(&response.items)
}

fn edit_config(config: &Config) -> Result<()> {
    if !config.config_path.exists() {
        config.write_config_file()?;
    }
    edit::edit_file(&config.config_path)?;
    // Catch mistakes before the next run does
    Config::from_path(&config.config_path)?;
    Ok(())
}
