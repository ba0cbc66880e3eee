//! Loan Approval Service - Main Entry Point
//!
//! Loads the classifier once, then serves approval predictions over HTTP.

use anyhow::{Context, Result};
use loan_approval_service::{
    config::AppConfig,
    logging::init_tracing,
    metrics::{MetricsReporter, ServiceMetrics},
    models::classifier::OnnxClassifier,
    scorer::ApprovalScorer,
    server::{build_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Starting Loan Approval Service");
    info!(
        model_path = %config.model.path,
        bind = %config.server.bind_addr(),
        "Configuration loaded successfully"
    );

    let classifier = OnnxClassifier::load(
        &config.model.path,
        &config.model.name,
        config.model.onnx_threads,
    )
    .context("Failed to load classifier")?;

    let scorer = ApprovalScorer::new(Arc::new(classifier));
    info!(
        features = scorer.encoder().feature_count(),
        "Feature encoder initialized"
    );

    let metrics = Arc::new(ServiceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let app = build_router(
        AppState::new(scorer, metrics.clone()),
        &config.server.allowed_origins,
    );

    let addr: SocketAddr = config
        .server
        .bind_addr()
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Service shutting down...");
    metrics.log_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
