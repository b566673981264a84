use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkmgmt_app::platform::config::Config;
use linkmgmt_app::platform::logging::{self, LogDestination};
use linkmgmt_app::platform::{app, headless};
use linkmgmt_core::{AppConfig, Launch};
use linkmgmt_engine::{
    ApiSettings, ReqwestLinkApi, ReqwestScraper, ScrapeOrchestrator, ScraperSettings,
};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "link-mgmt", version, about = "Manage saved links from the terminal")]
struct Cli {
    /// Config file to use instead of ~/.config/link-mgmt/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Storage API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Extraction service base URL.
    #[arg(long, global = true)]
    scraper_url: Option<String>,
    /// Scrape timeout in seconds.
    #[arg(long, global = true)]
    scrape_timeout: Option<u64>,
    /// Log file for the interactive UI.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the add-link flow directly.
    Add,
    /// Open the manage-links flow directly.
    Manage,
    /// Print all links.
    List,
    /// Scrape one URL and print the result.
    Scrape { url: String },
    /// Create an account and save its API key to the config file.
    Register { email: String },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Set a value, e.g. `cli.base_url=http://localhost:8080`.
    Set { assignment: String },
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.cli.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.cli.api_key = api_key.clone();
        }
        if let Some(scraper_url) = &self.scraper_url {
            config.cli.scraper_url = scraper_url.clone();
        }
        if let Some(secs) = self.scrape_timeout.filter(|secs| *secs > 0) {
            config.cli.scrape_timeout = secs;
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Command::Add) | Some(Command::Manage));
    let destination = if interactive {
        match &cli.log_file {
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::default_file(),
        }
    } else {
        match &cli.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    };
    logging::initialize(destination, cli.log_level());

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_or_create(&config_path)?;

    if let Some(Command::Config(command)) = &cli.command {
        return match command {
            ConfigCommand::Show => {
                cli.apply_overrides(&mut config);
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigCommand::Set { assignment } => {
                config.set_value(assignment)?;
                config.save(&config_path)?;
                println!("Updated {}", config_path.display());
                Ok(())
            }
        };
    }
    cli.apply_overrides(&mut config);

    let api = ReqwestLinkApi::new(ApiSettings {
        base_url: config.cli.base_url.clone(),
        api_key: config.api_key().map(str::to_string),
        ..ApiSettings::default()
    })
    .context("failed to build API client")?;
    let scraper = Arc::new(
        ReqwestScraper::new(ScraperSettings {
            base_url: config.cli.scraper_url.clone(),
            request_timeout: config.scrape_timeout() + Duration::from_secs(5),
        })
        .context("failed to build scraper client")?,
    );
    let orchestrator = ScrapeOrchestrator::new(scraper.clone());

    let launch = match cli.command {
        None => Launch::Menu,
        Some(Command::Add) => Launch::AddLink,
        Some(Command::Manage) => Launch::ManageLinks,
        Some(Command::List) => return headless::list_links(&api).await,
        Some(Command::Scrape { url }) => {
            return headless::scrape_url(&scraper, &orchestrator, &url, config.scrape_timeout())
                .await
        }
        Some(Command::Register { email }) => {
            let mut stored = Config::load_or_create(&config_path)?;
            return headless::register_user(&api, &mut stored, &config_path, &email).await;
        }
        Some(Command::Config(_)) => return Ok(()),
    };

    let app_config = AppConfig {
        scrape_timeout: config.scrape_timeout(),
        launch,
    };
    app::run_app(app_config, Arc::new(api), orchestrator).await
}
