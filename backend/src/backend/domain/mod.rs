//! # Domain Module
//!
//! Contains all business logic for the Avalanche enrollment and finance backend.
//!
//! This module encapsulates the rules that sit between the HTTP surface and
//! the store: numbering, derived fields, audit side-effects, multi-step writes
//! and document export. It works against the storage traits only and never
//! knows which backend is serving them.
//!
//! ## Module Organization
//!
//! - **student_service**: Enrollment CRUD, search and head-count statistics
//! - **evolution_service**: Dated progress notes attached to a student
//! - **transaction_service**: Ledger CRUD, item replacement and statistics
//! - **export_service** / **export**: PDF rendering of a transaction
//! - **numbering**: Matricula and transaction number generation
//! - **status_transition**: Automatic evolution record on inactivation
//! - **age**: Age derivation from the birth date
//! - **search**: Client-side list filters
//! - **confirmation**: Two-phase delete confirmation
//! - **validation**: Required-field checks
//!
//! ## Business Rules
//!
//! - Matriculas are 4-digit, zero-padded and sequential; the store sequence numbers transactions
//! - Age is recomputed from the birth date on every save
//! - Moving a student from Ativo to Inativo writes one `mudanca_status` record, best-effort
//! - An item's final value is always quantity × unit value; a transaction's total is their sum
//! - Replacing items means delete-all then insert-all, never a diff
//! - Deleting a student deletes its evolution records first

pub mod age;
pub mod confirmation;
pub mod evolution_service;
pub mod export;
pub mod export_service;
pub mod numbering;
pub mod search;
pub mod status_transition;
pub mod student_service;
pub mod transaction_service;
pub mod validation;

pub use confirmation::{ConfirmationOutcome, DeleteConfirmation, CONFIRMATION_WINDOW};
pub use evolution_service::EvolutionService;
pub use export_service::{ExportService, ExportedDocument};
pub use numbering::NumberingService;
pub use status_transition::StatusTransitionLogger;
pub use student_service::StudentService;
pub use transaction_service::TransactionService;
pub use validation::ValidationError;
