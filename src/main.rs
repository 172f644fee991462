use anyhow::{Context, Result};
use clap::Parser;

use tablegrip::cli::{CliArgs, Command};
use tablegrip::scenario::Scenario;
use tablegrip::ResizeConfig;

fn main() -> Result<()> {
    tablegrip::tracing::init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => ResizeConfig::load_from(path),
        None => ResizeConfig::load(),
    };

    match args.command {
        Command::Replay { scenario, pretty } => {
            let loaded = Scenario::load(&scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;
            let outcome = loaded.replay(&config);
            tracing::info!(
                history_len = outcome.history_len,
                phase = %outcome.phase,
                "replay finished"
            );
            let json = if pretty {
                serde_json::to_string_pretty(&outcome)
            } else {
                serde_json::to_string(&outcome)
            }
            .context("Failed to serialize replay outcome")?;
            println!("{}", json);
        }
        Command::Config => {
            let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
            print!("{}", yaml);
        }
    }

    Ok(())
}
