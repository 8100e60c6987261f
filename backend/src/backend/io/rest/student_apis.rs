//! # REST API for Students
//!
//! Endpoints for enrolling, listing, editing and deleting students.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::{SearchQuery, StudentProfile};

use super::delete_gate::confirmation_required;
use super::evolution_apis;
use super::error::{
    failure_response, not_found, STUDENT_DELETE_FAILED, STUDENT_LOAD_FAILED, STUDENT_NOT_FOUND,
    STUDENT_SAVE_FAILED,
};
use crate::backend::domain::ConfirmationOutcome;
use crate::backend::storage::Connection;
use crate::backend::AppState;

/// Create a router for student related APIs
pub fn router<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_students::<C>).post(create_student::<C>))
        .route("/stats", get(get_statistics::<C>))
        .route(
            "/:id",
            get(get_student::<C>)
                .put(update_student::<C>)
                .delete(delete_student::<C>),
        )
        .route(
            "/:id/evolution",
            get(evolution_apis::list_records::<C>).post(evolution_apis::create_record::<C>),
        )
}

/// List students, optionally filtered by `?search=`
pub async fn list_students<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /api/students - query: {:?}", query);

    let result = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.student_service.search_students(term).await,
        _ => state.student_service.list_students().await,
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => failure_response(&e, STUDENT_LOAD_FAILED),
    }
}

pub async fn get_student<C: Connection>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/students/{}", student_id);

    match state.student_service.get_student(&student_id).await {
        Ok(Some(student)) => (StatusCode::OK, Json(student)).into_response(),
        Ok(None) => not_found(STUDENT_NOT_FOUND),
        Err(e) => failure_response(&e, STUDENT_LOAD_FAILED),
    }
}

pub async fn create_student<C: Connection>(
    State(state): State<AppState<C>>,
    Json(profile): Json<StudentProfile>,
) -> impl IntoResponse {
    info!("POST /api/students - name: {}", profile.full_name);

    match state.student_service.create_student(profile).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => failure_response(&e, STUDENT_SAVE_FAILED),
    }
}

pub async fn update_student<C: Connection>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
    Json(profile): Json<StudentProfile>,
) -> impl IntoResponse {
    info!("PUT /api/students/{}", student_id);

    match state.student_service.update_student(&student_id, profile).await {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => not_found(STUDENT_NOT_FOUND),
        Err(e) => failure_response(&e, STUDENT_SAVE_FAILED),
    }
}

/// First call arms the confirmation (202); a repeat within the window deletes (204)
pub async fn delete_student<C: Connection>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/students/{}", student_id);

    match state.delete_gate.request("students", &student_id) {
        Ok(ConfirmationOutcome::Armed { expires_in }) => return confirmation_required(expires_in),
        Ok(ConfirmationOutcome::Confirmed) => {}
        Err(e) => return failure_response(&e, STUDENT_DELETE_FAILED),
    }

    match state.student_service.delete_student(&student_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(STUDENT_NOT_FOUND),
        Err(e) => failure_response(&e, STUDENT_DELETE_FAILED),
    }
}

pub async fn get_statistics<C: Connection>(State(state): State<AppState<C>>) -> impl IntoResponse {
    info!("GET /api/students/stats");

    match state.student_service.get_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => failure_response(&e, STUDENT_LOAD_FAILED),
    }
}
