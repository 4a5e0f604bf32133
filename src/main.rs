use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use pr_assist::config::Config;
use pr_assist::event::EnvEventSource;
use pr_assist::generate::Generators;
use pr_assist::inputs::EnvInputs;
use pr_assist::orchestrator::{CliClientFactory, RetryPolicy, RunOutcome, Runner};
use pr_assist::{logging, reporter};

#[derive(Parser, Debug)]
#[command(name = "pr-assist")]
#[command(about = "Draft PR descriptions, review diffs and generate unit tests from a GitHub Action")]
#[command(version)]
struct Args {
    /// Settings file (default: $GITHUB_WORKSPACE/.github/pr-assist.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Attempts allowed after the first failure
    #[arg(long)]
    max_retries: Option<u32>,

    /// Pause between attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            let outcome = RunOutcome::TerminalFailure {
                attempts: 0,
                kind: "configuration",
                message: format!("{:#}", e),
            };
            return ExitCode::from(reporter::report(&outcome));
        }
    };

    let mut policy = RetryPolicy::from_config(&config.retry);
    if let Some(max_retries) = args.max_retries {
        policy.max_retries = max_retries;
    }
    if let Some(delay_ms) = args.retry_delay_ms {
        policy.delay = Duration::from_millis(delay_ms);
    }

    let runner = Runner::new(
        Arc::new(EnvInputs),
        Arc::new(EnvEventSource),
        Arc::new(CliClientFactory::new(config.model.clone())),
        Arc::new(Generators::new(config.unit_test.clone())),
        policy,
    );

    let outcome = runner.run().await;
    ExitCode::from(reporter::report(&outcome))
}
