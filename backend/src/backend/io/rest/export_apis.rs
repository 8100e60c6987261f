//! # REST API for Document Export
//!
//! PDF download of a transaction, and server-side export into the configured directory.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use log::info;
use shared::ExportToPathResponse;

use super::error::{failure_response, not_found, PDF_FAILED, TRANSACTION_NOT_FOUND};
use crate::backend::storage::Connection;
use crate::backend::AppState;

/// Stream `movimentacao-<number>.pdf` as an attachment
pub async fn download_pdf<C: Connection>(
    State(state): State<AppState<C>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/transactions/{}/pdf", transaction_id);

    match state
        .export_service
        .export_transaction(&transaction_id, &state.transaction_service)
        .await
    {
        Ok(Some(document)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.file_name),
                ),
            ],
            document.bytes,
        )
            .into_response(),
        Ok(None) => not_found(TRANSACTION_NOT_FOUND),
        Err(e) => failure_response(&e, PDF_FAILED),
    }
}

/// Write the PDF into the export directory and report where it went
pub async fn export_to_path<C: Connection>(
    State(state): State<AppState<C>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/transactions/{}/export", transaction_id);

    match state
        .export_service
        .export_to_path(&transaction_id, &state.transaction_service)
        .await
    {
        Ok(Some(path)) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let response = ExportToPathResponse {
                file_name,
                file_path: path.to_string_lossy().into_owned(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(None) => not_found(TRANSACTION_NOT_FOUND),
        Err(e) => failure_response(&e, PDF_FAILED),
    }
}
