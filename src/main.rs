use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use validate_config::cli::{Cli, ValidatorConfig};
use validate_config::compiler::SchemaCompiler;
use validate_config::fetcher::{FetcherConfig, SchemaFetcher};
use validate_config::orchestrator::Orchestrator;
use validate_config::output;

/// Cap on sources validated concurrently.
const MAX_CONCURRENT_FILES: usize = 8;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(valid) => {
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = ValidatorConfig::from_cli(cli)?;

    let fetcher = Arc::new(SchemaFetcher::new(&FetcherConfig {
        timeout: config.http_timeout,
        ignore_tls_errors: config.ignore_tls_errors,
    })?);
    let compiler = SchemaCompiler::new(fetcher);
    let orchestrator = Arc::new(Orchestrator::new(
        compiler,
        config.schema.clone(),
        config.schema_override,
    ));

    let report = orchestrator
        .validate_batch(config.files.clone(), MAX_CONCURRENT_FILES)
        .await?;

    let rendered = output::render(&report, config.report, config.color)?;
    match &config.output {
        Some(path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
        None => println!("{rendered}"),
    }

    Ok(report.valid)
}
