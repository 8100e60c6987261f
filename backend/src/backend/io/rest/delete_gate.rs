//! Process-wide holder of the two-phase delete confirmation.
//!
//! One confirmation is armed at a time, keyed by `<collection>/<id>`, so arming
//! a second target disarms the first.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::DeleteConfirmationResponse;

use super::error::CONFIRM_DELETE_MESSAGE;
use crate::backend::domain::{ConfirmationOutcome, DeleteConfirmation};

#[derive(Clone, Default)]
pub struct DeleteGate {
    confirmation: Arc<Mutex<DeleteConfirmation>>,
}

impl DeleteGate {
    pub fn new(window: Duration) -> Self {
        Self {
            confirmation: Arc::new(Mutex::new(DeleteConfirmation::new(window))),
        }
    }

    pub fn request(&self, collection: &str, id: &str) -> Result<ConfirmationOutcome> {
        let mut confirmation = self
            .confirmation
            .lock()
            .map_err(|_| anyhow!("delete confirmation lock poisoned"))?;
        Ok(confirmation.request(&format!("{collection}/{id}"), Instant::now()))
    }
}

/// 202 body telling the caller to repeat the request
pub fn confirmation_required(expires_in: Duration) -> Response {
    (
        StatusCode::ACCEPTED,
        Json(DeleteConfirmationResponse {
            confirmation_required: true,
            expires_in_ms: u64::try_from(expires_in.as_millis()).unwrap_or(u64::MAX),
            message: CONFIRM_DELETE_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
