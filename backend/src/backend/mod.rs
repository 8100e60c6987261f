//! # Backend Module
//!
//! Contains all non-UI logic for the academy's enrollment and ledger system.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Business rules for students, evolution notes and transactions
//! - **Storage**: Persistence behind the hosted REST store (or in memory)
//! - **IO**: The JSON API the presentation layer talks to
//!
//! ## Architecture
//!
//! ```text
//! Presentation (browser SPA)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (services, validation, numbering, export)
//!     ↓
//! Storage Layer (PostgREST client or in-memory tables)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the application state from a storage connection
//! - Set up the REST API router with CORS configuration
//! - Keep the services generic over the [`Connection`] so tests can run in memory

pub mod domain;
pub mod io;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::Method,
    response::Json,
    routing::get,
    Router,
};
use log::info;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::{
    EvolutionService, ExportService, StudentService, TransactionService, CONFIRMATION_WINDOW,
};
use crate::backend::io::rest::{evolution_apis, student_apis, transaction_apis, DeleteGate};
use crate::backend::storage::Connection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub student_service: StudentService<C>,
    pub evolution_service: EvolutionService<C>,
    pub transaction_service: TransactionService<C>,
    pub export_service: ExportService,
    pub delete_gate: DeleteGate,
}

/// Initialize the backend with all required services
pub fn initialize_backend<C: Connection>(connection: C, export_dir: impl Into<PathBuf>) -> AppState<C> {
    let connection = Arc::new(connection);

    info!("Setting up domain model");
    let student_service = StudentService::new(connection.clone());
    let evolution_service = EvolutionService::new(connection.clone());
    let transaction_service = TransactionService::new(connection);
    let export_service = ExportService::new(export_dir);

    info!("Setting up application state");
    AppState {
        student_service,
        evolution_service,
        transaction_service,
        export_service,
        delete_gate: DeleteGate::new(CONFIRMATION_WINDOW),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router<C: Connection>(app_state: AppState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/students", student_apis::router::<C>())
        .nest("/evolution", evolution_apis::router::<C>())
        .nest("/transactions", transaction_apis::router::<C>());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
