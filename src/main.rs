use std::path::PathBuf;

use anyhow::{anyhow, Result};
use env_logger::Env;

use aquabridge::command;
use aquabridge::constants::{defaults, envvars};
use aquabridge::drivers::DriverKind;
use aquabridge::helpers;

const CMD_ENVIRONMENT: &str = "environment";
const CMD_FEEDING: &str = "feeding";
const CMD_BRIDGE: &str = "bridge";

#[tokio::main]
async fn main() -> Result<()> {
    helpers::load_dotenv();
    env_logger::Builder::from_env(
        Env::default().filter_or(envvars::LOGGING_LEVEL, defaults::LOG_LEVEL),
    )
    .init();

    let mut args = pico_args::Arguments::from_env();
    let config_path: Option<PathBuf> = args.opt_value_from_str("--config")?;
    let kind = match args.subcommand()?.as_deref() {
        Some(CMD_ENVIRONMENT) => DriverKind::Environment,
        Some(CMD_FEEDING) => DriverKind::Feeding,
        Some(CMD_BRIDGE) => DriverKind::Bridge,
        _ => {
            return Err(anyhow!(
                "Subcommand must be one of '{CMD_ENVIRONMENT}', '{CMD_FEEDING}', '{CMD_BRIDGE}'"
            ))
        }
    };
    command::run_driver(kind, config_path).await
}
