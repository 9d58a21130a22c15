use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use joke_extract::config::{PipelineArgs, PipelineConfig};
use joke_extract::logging;
use tracing::error;

fn main() -> ExitCode {
    let config = PipelineConfig::from(PipelineArgs::parse());
    logging::init_tracing(&config.log_level);

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when every extractor ran without success
fn run(config: &PipelineConfig) -> Result<bool> {
    let pipeline = config.pipeline().with_context(|| {
        format!(
            "Failed to load extractors from {}",
            config
                .extractors_dir
                .as_deref()
                .map_or_else(String::new, |d| d.display().to_string())
        )
    })?;
    config
        .ensure_output_dir()
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let outcome = pipeline.process(&config.email, &config.output_dir)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(outcome.succeeded())
}
