//! Expenseweb main entry point

use anyhow::Context;
use clap::Parser;
use expenseweb_api::start_server;
use expenseweb_config::{Config, ConfigError};
use expenseweb_core::ExpenseController;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "expenseweb")]
#[command(author = "Expenseweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A small personal expense tracking backend", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides server.port and PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing_file) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if let Some(path) = missing_file {
        log::warn!("Config file {} not found, using defaults", path);
    }
    log::info!(
        "Config loaded: bind={}, origins={}",
        config.bind_address(),
        config.cors.allowed_origins.join(", ")
    );

    let rt = Runtime::new().context("Failed to start the async runtime")?;
    let result = rt.block_on(start_server(config, ExpenseController::default()));

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Resolve the effective configuration: file (or defaults), then `PORT`,
/// then CLI flags. Returns the missing file path when defaults were used.
fn load_config(args: &Args) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, missing_file) = match Config::load(args.config.clone()) {
        Ok(config) => (config, None),
        Err(ConfigError::FileNotFound { path }) => (Config::default(), Some(path)),
        Err(e) => return Err(e),
    };

    config.apply_env_overrides()?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok((config, missing_file))
}
