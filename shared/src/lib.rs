//! Wire-contract types for the Avalanche academy backend.
//!
//! These types are what the remote store reads and writes and what the HTTP API exchanges with
//! the presentation layer. Field and enum spellings on the wire (`nome_completo`, `"Ativo"`,
//! `"mudanca_status"`, ...) are part of the store contract and must round-trip unchanged, so every
//! Rust-side name carries an explicit serde rename.

mod serde_helpers;

pub mod evolution;
pub mod finance;
pub mod student;

pub use evolution::*;
pub use finance::*;
pub use student::*;

use serde::{Deserialize, Serialize};

/// Body returned when a delete needs a second request to go through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmationResponse {
    pub confirmation_required: bool,
    pub expires_in_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Optional `?search=` parameter accepted by the list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Where a server-side export was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub file_name: String,
    pub file_path: String,
}
