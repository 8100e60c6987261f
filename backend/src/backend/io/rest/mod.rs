//! # REST API Interface Layer
//!
//! Provides the HTTP endpoints the presentation layer talks to.
//! This layer handles:
//! - JSON request/response serialization
//! - Translation of domain results into status codes and pt-BR messages
//! - The two-phase confirmation of student and evolution-record deletes
//!
//! ## Design Principles
//!
//! - **Domain Separation**: Pure translation layer without business logic
//! - **No Leaks**: Store errors are logged, never returned to the caller
//! - **Request Logging**: Every handler logs the route it serves

pub mod delete_gate;
pub mod error;
pub mod evolution_apis;
pub mod export_apis;
pub mod student_apis;
pub mod transaction_apis;

pub use delete_gate::DeleteGate;
