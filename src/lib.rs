pub mod buffer;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod providers;
pub mod request;
pub mod role;
pub mod session;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser};
use reqwest::Client;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use cli::Cli;
use config::Config;
use gateway::OllamaBackend;
use role::HostEnvironment;
use session::{Session, compose_user_input};

const USAGE_EXIT_CODE: u8 = 2;

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    let config_path = cli.config.clone().or_else(Config::default_path);
    if cli.init_config {
        let path = config_path.ok_or_else(|| anyhow!("Could not determine a config directory"))?;
        Config::write_defaults(&path, cli.force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = Config::load(config_path.as_deref())?;
    info!(
        config_path = %display_path(config_path.as_ref()),
        base_url = %cfg.base_url,
        model = %cfg.model,
        timeout_secs = cfg.timeout_secs,
        buffer_size = cfg.buffer_size,
        "loaded runtime configuration"
    );

    if cli.show_config {
        println!("# {}", display_path(config_path.as_ref()));
        println!("{}", cfg.to_pretty_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let piped = read_piped_stdin()?;
    if piped.is_none() && cli.prompt.is_empty() {
        eprintln!("{}", Cli::command().render_help());
        return Ok(ExitCode::from(USAGE_EXIT_CODE));
    }
    let user_input = compose_user_input(piped.as_deref(), &cli.prompt);

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;
    let backend = OllamaBackend::new(&client, &cfg, cli.verbose);
    let host = HostEnvironment::detect();
    let mut session = Session::new(&cfg, backend, cli.role(), &host, cli.verbose);

    let mut stdout = io::stdout().lock();
    session.run_turn(&user_input, &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}

/// Reads all of stdin unless it is attached to a terminal.
fn read_piped_stdin() -> Result<Option<String>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(Some(input))
}

fn display_path(path: Option<&PathBuf>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| "<no config file>".to_string())
}
