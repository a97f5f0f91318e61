mod api;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubeask_k8s::KubeClient;
use kubeask_llm::BedrockInvoker;
use kubeask_query::QueryEngine;

use crate::api::AppState;
use crate::config::{Args, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args).context("Failed to load configuration")?;

    // Credential problems stop startup; nothing useful can be served without them
    let kube = Arc::new(KubeClient::connect(config.kubeconfig.as_deref()).await?);
    let model = Arc::new(BedrockInvoker::new(&config.model).await);

    let engine = QueryEngine::new(kube.clone(), model);
    let state = AppState::new(kube, engine, &config.default_namespace);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;

    info!(
        addr = %listener.local_addr()?,
        default_namespace = %config.default_namespace,
        "kubeask listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
