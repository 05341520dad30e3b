//! bedrock-daemon - Minecraft Bedrock dedicated server supervisor
//!
//! Without flags the binary runs as the daemon: update check, activation,
//! launch, and a local control interface until a shutdown request arrives.
//!
//! # Examples
//!
//! ```bash
//! # Run the daemon
//! bedrock-daemon
//!
//! # Ask the running daemon to count down and stop
//! bedrock-daemon --shutdown
//!
//! # Stop right away
//! bedrock-daemon --terminate
//! ```

use bd_server::{Cli, ServerErrorResult, daemon, logger, one_shot};

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Optional .env beside the working directory
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: {}", e.recovery_hint());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Error: {e}");
        eprintln!("Hint: {}", e.recovery_hint());
        return ExitCode::FAILURE;
    }

    if let Some(action) = cli.action() {
        let server_url = cli
            .server
            .clone()
            .unwrap_or_else(|| config.control.base_url());
        return one_shot::run(action, &server_url).await;
    }

    info!("Starting bedrock-daemon v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    match daemon::run(&config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            error!("Hint: {}", e.recovery_hint());
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> ServerErrorResult<bd_config::Config> {
    let config = bd_config::Config::load()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &bd_config::Config) -> ServerErrorResult<()> {
    let config_dir = bd_config::Config::config_dir()?;
    logger::initialize(&config.logging, &config_dir)
}
