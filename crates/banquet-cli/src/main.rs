mod app;
mod cli;
mod config;

use app::System;
use clap::Parser;
use cli::{Cli, Command};
use std::fs;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(cli.command, config))
}

async fn run(command: Command, config: config::AppConfig) -> anyhow::Result<()> {
    let system = System::build(&config)?;

    let output = match command {
        Command::Plan { criteria, user_id } => {
            let criteria = read_criteria(&criteria)?;
            serde_json::to_value(system.plan(&user_id, criteria).await?)?
        }
        Command::Correct { session, user_id, overrides } => {
            let overrides = match overrides {
                Some(path) => read_json_object(&path)?,
                None => serde_json::Map::new(),
            };
            serde_json::to_value(system.correct(session, &user_id, overrides).await?)?
        }
        Command::Enrich => system.retroactive_enrich().await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_criteria(path: &std::path::Path) -> anyhow::Result<banquet_types::Criteria> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn read_json_object(path: &std::path::Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} must contain a JSON object", path.display()),
    }
}
