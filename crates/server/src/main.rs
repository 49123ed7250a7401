//! Status Page REST API Server
//!
//! Resolves and validates the configured GitHub project, then serves the
//! status page API. Refuses to start if the project is not set up correctly.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use statuspage::{Diagnostic, GitHubSource, StatusPage, StatusPageConfig};
use statuspage_server::cli::{Args, TOKEN_ENV};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Diagnostic>() {
                Some(diagnostic) => eprint!("{}", diagnostic),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let mut args = Args::parse();

    let file = match args.config.take() {
        Some(path) => StatusPageConfig::load(&path)?,
        None => StatusPageConfig::default(),
    };
    let settings = args
        .into_settings(&file)
        .map_err(|e| e.diagnostic())?;

    let token = std::env::var(TOKEN_ENV).map_err(|_| {
        Diagnostic::new(format!("{} is not set", TOKEN_ENV))
            .cause("The server reads the GitHub access token from the environment only")
            .fix(format!("export {}=$(gh auth token)", TOKEN_ENV))
            .fix("Use a token with the read:project and repo scopes")
    })?;

    info!("Starting status page API server...");
    info!(
        "Using project {} #{} at {}",
        settings.project.owner, settings.project.number, settings.api_url
    );

    let source = GitHubSource::with_endpoint(settings.api_url.clone(), token);
    let startup_settings = settings.clone();
    let page = tokio::task::spawn_blocking(move || StatusPage::connect(source, &startup_settings))
        .await
        .context("Startup check was aborted")?
        .map_err(|e| e.diagnostic())?;
    info!("Project configuration verified");

    let app = statuspage_server::app(Arc::new(page));

    let listener = tokio::net::TcpListener::bind(&settings.addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.addr))?;
    info!("Server listening on http://{}", settings.addr);

    axum::serve(listener, app).await?;

    Ok(())
}
