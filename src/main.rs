//! Consultation aggregator — binary entrypoint.
//! Loads config, runs one sync pass and maps fatal errors to the exit code.

use std::process::ExitCode;

use consultation_aggregator::{config, sync, FatalError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("consultation_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let result = match config::load_config_default() {
        Ok(cfg) => sync::run(&cfg).await,
        Err(e) => Err(FatalError::Config(e)),
    };

    match result {
        Ok(report) => {
            tracing::info!(created = report.created, failed = report.failed, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
