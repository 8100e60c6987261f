//! # REST API for Financial Transactions
//!
//! Endpoints for the ledger: transactions with their items, search and totals.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use shared::{CreateTransactionRequest, SearchQuery, UpdateTransactionRequest};

use super::error::{
    failure_response, not_found, TRANSACTION_DELETE_FAILED, TRANSACTION_LOAD_FAILED,
    TRANSACTION_NOT_FOUND, TRANSACTION_SAVE_FAILED,
};
use super::export_apis;
use crate::backend::storage::Connection;
use crate::backend::AppState;

/// Create a router for transaction related APIs
pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_transactions::<C>).post(create_transaction::<C>))
        .route("/stats", get(get_statistics::<C>))
        .route(
            "/:id",
            get(get_transaction::<C>)
                .put(update_transaction::<C>)
                .delete(delete_transaction::<C>),
        )
        .route("/:id/pdf", get(export_apis::download_pdf::<C>))
        .route("/:id/export", post(export_apis::export_to_path::<C>))
}

/// List transactions, optionally filtered by `?search=`
pub async fn list_transactions<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /api/transactions - query: {:?}", query);

    let result = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.transaction_service.search_transactions(term).await,
        _ => state.transaction_service.list_transactions().await,
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => failure_response(&e, TRANSACTION_LOAD_FAILED),
    }
}

/// Get a transaction together with its items
pub async fn get_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/transactions/{}", transaction_id);

    match state
        .transaction_service
        .get_transaction_with_items(&transaction_id)
        .await
    {
        Ok(Some(transaction)) => (StatusCode::OK, Json(transaction)).into_response(),
        Ok(None) => not_found(TRANSACTION_NOT_FOUND),
        Err(e) => failure_response(&e, TRANSACTION_LOAD_FAILED),
    }
}

pub async fn create_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/transactions - company: {}, items: {}",
        request.header.company_name,
        request.items.len()
    );

    match state.transaction_service.create_transaction(request).await {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => failure_response(&e, TRANSACTION_SAVE_FAILED),
    }
}

pub async fn update_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    Path(transaction_id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/transactions/{}", transaction_id);

    match state
        .transaction_service
        .update_transaction(&transaction_id, request)
        .await
    {
        Ok(Some(transaction)) => (StatusCode::OK, Json(transaction)).into_response(),
        Ok(None) => not_found(TRANSACTION_NOT_FOUND),
        Err(e) => failure_response(&e, TRANSACTION_SAVE_FAILED),
    }
}

pub async fn delete_transaction<C: Connection>(
    State(state): State<AppState<C>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{}", transaction_id);

    match state
        .transaction_service
        .delete_transaction(&transaction_id)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(TRANSACTION_NOT_FOUND),
        Err(e) => failure_response(&e, TRANSACTION_DELETE_FAILED),
    }
}

pub async fn get_statistics<C: Connection>(State(state): State<AppState<C>>) -> impl IntoResponse {
    info!("GET /api/transactions/stats");

    match state.transaction_service.get_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => failure_response(&e, TRANSACTION_LOAD_FAILED),
    }
}
