use std::io::Read;
use std::process::ExitCode;

use woord_srs::config::SchedulerConfig;
use woord_srs::logging::init_tracing;
use woord_srs::{ReviewStep, SrsError};

const USAGE: &str = "usage: woord-srs <history.json | ->";

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match SchedulerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_tracing(&config);

    let Some(source) = std::env::args().nth(1) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(&config, &source) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, source = %source, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &SchedulerConfig, source: &str) -> Result<String, SrsError> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };

    let history: Vec<ReviewStep> = serde_json::from_str(&raw)?;
    let model = config.model()?;
    tracing::info!(
        steps = history.len(),
        target_retention = model.target_retention(),
        "replaying review history"
    );

    let outcomes = model.replay(&history)?;
    Ok(serde_json::to_string_pretty(&outcomes)?)
}
