//! Translation of domain outcomes into HTTP responses.
//!
//! Validation failures go back to the caller verbatim. Every other failure is
//! logged with its full chain and answered with a generic pt-BR message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use shared::ErrorResponse;

use crate::backend::domain::ValidationError;

pub const STUDENT_LOAD_FAILED: &str = "Erro ao carregar alunos.";
pub const STUDENT_SAVE_FAILED: &str = "Erro ao salvar aluno. Verifique os dados e tente novamente.";
pub const STUDENT_DELETE_FAILED: &str = "Erro ao excluir aluno.";
pub const STUDENT_NOT_FOUND: &str = "Aluno não encontrado.";

pub const EVOLUTION_LOAD_FAILED: &str = "Erro ao carregar registros de evolução.";
pub const EVOLUTION_SAVE_FAILED: &str = "Erro ao salvar registro de evolução.";
pub const EVOLUTION_DELETE_FAILED: &str = "Erro ao excluir registro.";
pub const EVOLUTION_NOT_FOUND: &str = "Registro não encontrado.";

pub const TRANSACTION_LOAD_FAILED: &str = "Erro ao carregar movimentações.";
pub const TRANSACTION_SAVE_FAILED: &str = "Erro ao salvar movimentação. Tente novamente.";
pub const TRANSACTION_DELETE_FAILED: &str = "Erro ao excluir movimentação.";
pub const TRANSACTION_NOT_FOUND: &str = "Movimentação não encontrada.";

pub const PDF_FAILED: &str = "Erro ao gerar PDF.";

pub const CONFIRM_DELETE_MESSAGE: &str = "Clique novamente para confirmar";

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub fn not_found(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, message)
}

/// 400 with the validation message, or 500 with `message`
pub fn failure_response(err: &anyhow::Error, message: &str) -> Response {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return error_response(StatusCode::BAD_REQUEST, &validation.to_string());
    }

    error!("{}: {:#}", message, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = anyhow::Error::from(ValidationError::MissingCompanyName);
        let response = failure_response(&err, TRANSACTION_SAVE_FAILED);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_are_hidden_behind_a_generic_message() {
        let err = anyhow!("connection refused").context("Failed to insert student");
        let response = failure_response(&err, STUDENT_SAVE_FAILED);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
