//! Q&A Server
//!
//! HTTP service for questions and their answers, backed either by an embedded
//! SQLite database or by in-process maps.

mod config;
mod handlers;
mod router;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use qa_core::{AnswerRepo, QuestionRepo};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, Settings, StorageMode};
use crate::services::{AnswerService, QuestionService};
use crate::storage::{Database, MemoryAnswerRepo, MemoryQuestionRepo, MemoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<QuestionService>,
    pub answers: Arc<AnswerService>,
}

impl AppState {
    pub fn new(questions: Arc<dyn QuestionRepo>, answers: Arc<dyn AnswerRepo>) -> Self {
        Self {
            questions: Arc::new(QuestionService::new(questions, answers.clone())),
            answers: Arc::new(AnswerService::new(answers)),
        }
    }
}

/// Every request goes through the single dispatcher.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(handlers::audit::audit))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = handlers::panic_message(info.payload());
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&settings) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Q&A Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(settings).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!(e))
}

async fn run_server(settings: Settings) -> Result<()> {
    info!(
        "Config loaded: bind={}, storage={:?}",
        settings.bind_address, settings.storage
    );

    let (state, database) = match settings.storage {
        StorageMode::Sqlite => {
            let db = Database::connect(&settings.database_url, settings.max_connections)
                .await
                .context("Failed to initialize database")?;
            let state = AppState::new(Arc::new(db.question_repo()), Arc::new(db.answer_repo()));
            (state, Some(db))
        }
        StorageMode::Memory => {
            warn!("Using in-memory storage, data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            let state = AppState::new(
                Arc::new(MemoryQuestionRepo::new(store.clone())),
                Arc::new(MemoryAnswerRepo::new(store)),
            );
            (state, None)
        }
    };

    let app = app(state, Duration::from_secs(settings.request_timeout_secs));

    let addr: SocketAddr = settings
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
