//! Run the analysis pipeline against a local text file and print the result
//! as pretty JSON. Configuration comes from the environment (see
//! `config::GptConfig::from_env`).

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use docubot::config::GptConfig;
use docubot::gpt::{IamTokenManager, YandexGptClient};
use docubot::pipeline::{AnalysisSource, DocumentAnalyzer, DEFAULT_MAX_TOKENS};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: analyze <text-file>");
        return ExitCode::FAILURE;
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let config = GptConfig::from_env()?;

    let tokens = Arc::new(IamTokenManager::with_endpoint(
        config.key.clone(),
        &config.iam_endpoint,
    ));
    let client = YandexGptClient::new(&config, tokens);
    let analyzer = DocumentAnalyzer::new(Box::new(client));

    let outcome = analyzer.analyze(&text, DEFAULT_MAX_TOKENS)?;
    if outcome.source == AnalysisSource::Cache {
        tracing::info!("served from cache");
    }

    println!("{}", serde_json::to_string_pretty(outcome.result.as_ref())?);
    Ok(())
}
