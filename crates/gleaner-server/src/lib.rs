//! Gleaner Server
//!
//! HTTP front end of the analysis pipeline: single and batch analysis,
//! background batches, search and retrieval of stored analyses.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod registry;

use config::ServerConfig;
use gleaner_extractor::LlmExtractor;
use gleaner_llm::{LlmClient, LlmError, LlmProvider};
use gleaner_pipeline::AnalysisService;
use gleaner_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use registry::BatchRegistry;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The model provider could not be constructed
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// The database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Wire provider, extractor, store and pipeline together
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;

    let client = LlmClient::from_config(&config.llm)?;
    let model = client.model_name().to_string();
    let extractor = LlmExtractor::new(client, &config.extractor);
    let store = SqliteStore::new(&config.database_path)?;
    let service = AnalysisService::new(extractor, store, &config.extractor);

    let mut state = AppState::new(service, config.pipeline.clone(), model);
    state.batches = BatchRegistry::with_completed_limit(config.completed_batch_limit);
    Ok(state)
}

/// Start the HTTP server
///
/// Builds the application state from `config` and serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Gleaner server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!(
        "Batch limits: {} concurrent, {} texts max",
        config.pipeline.max_concurrency, config.pipeline.max_batch_size
    );

    let state = build_state(&config)?;
    info!("Using model {}", state.model);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
