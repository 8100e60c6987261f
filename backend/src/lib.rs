//! Enrollment and financial ledger backend for the Projeto Avalanche academy.
//!
//! See [`backend`] for the layered services and the REST API, [`config`] for the
//! environment the server reads at start-up.

pub mod backend;
pub mod config;
pub mod logging;
