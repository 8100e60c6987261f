//! # REST API for Evolution Records
//!
//! Listing and creation hang off the student (`/api/students/:id/evolution`);
//! a single record is addressed as `/api/evolution/:id`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::EvolutionRequest;

use super::delete_gate::confirmation_required;
use super::error::{
    failure_response, not_found, EVOLUTION_DELETE_FAILED, EVOLUTION_LOAD_FAILED,
    EVOLUTION_NOT_FOUND, EVOLUTION_SAVE_FAILED, STUDENT_NOT_FOUND,
};
use crate::backend::domain::ConfirmationOutcome;
use crate::backend::storage::Connection;
use crate::backend::AppState;

pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new().route(
        "/:id",
        get(get_record::<C>)
            .put(update_record::<C>)
            .delete(delete_record::<C>),
    )
}

pub async fn list_records<C: Connection>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/evolution", student_id);

    match state.evolution_service.list_records(&student_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => failure_response(&e, EVOLUTION_LOAD_FAILED),
    }
}

pub async fn create_record<C: Connection>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
    Json(request): Json<EvolutionRequest>,
) -> impl IntoResponse {
    info!("POST /api/students/{}/evolution", student_id);

    match state.evolution_service.create_record(&student_id, request).await {
        Ok(Some(record)) => (StatusCode::CREATED, Json(record)).into_response(),
        Ok(None) => not_found(STUDENT_NOT_FOUND),
        Err(e) => failure_response(&e, EVOLUTION_SAVE_FAILED),
    }
}

pub async fn get_record<C: Connection>(
    State(state): State<AppState<C>>,
    Path(record_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/evolution/{}", record_id);

    match state.evolution_service.get_record(&record_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => not_found(EVOLUTION_NOT_FOUND),
        Err(e) => failure_response(&e, EVOLUTION_LOAD_FAILED),
    }
}

pub async fn update_record<C: Connection>(
    State(state): State<AppState<C>>,
    Path(record_id): Path<String>,
    Json(request): Json<EvolutionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/evolution/{}", record_id);

    match state.evolution_service.update_record(&record_id, request).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => not_found(EVOLUTION_NOT_FOUND),
        Err(e) => failure_response(&e, EVOLUTION_SAVE_FAILED),
    }
}

pub async fn delete_record<C: Connection>(
    State(state): State<AppState<C>>,
    Path(record_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/evolution/{}", record_id);

    match state.delete_gate.request("evolution", &record_id) {
        Ok(ConfirmationOutcome::Armed { expires_in }) => return confirmation_required(expires_in),
        Ok(ConfirmationOutcome::Confirmed) => {}
        Err(e) => return failure_response(&e, EVOLUTION_DELETE_FAILED),
    }

    match state.evolution_service.delete_record(&record_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(EVOLUTION_NOT_FOUND),
        Err(e) => failure_response(&e, EVOLUTION_DELETE_FAILED),
    }
}
