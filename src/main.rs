use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use override_bot::config::Config;
use override_bot::github::OctocrabClient;
use override_bot::jobs::FileJobStore;
use override_bot::overrides::OverrideHandler;
use override_bot::presubmits::PresubmitConfig;
use override_bot::server::{AppState, build_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "override_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "override-bot failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    info!(config = ?config, "Loaded configuration");

    let presubmits = match &config.presubmit_config {
        Some(path) => {
            let presubmits = PresubmitConfig::load(path)?;
            info!(path = %path.display(), count = presubmits.len(), "Loaded presubmit definitions");
            presubmits
        }
        None => PresubmitConfig::empty(),
    };

    let github = OctocrabClient::from_token(config.github_token.clone())?;
    let jobs = FileJobStore::new(config.job_dir.clone());
    let handler = OverrideHandler::new(github, jobs, presubmits);
    let app = build_router(AppState::new(handler, config.webhook_secret.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
