//! # Storage Module
//!
//! Handles all data persistence for the Avalanche backend.
//!
//! The domain layer only ever sees the traits in [`traits`]; a [`Connection`]
//! picked at startup decides which backend serves them.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: Students, evolution records, transaction headers and items
//! - **Sequence Access**: Store-generated transaction numbers
//! - **Storage Abstraction**: One repository trait per collection
//!
//! ## Backends
//!
//! - **rest**: The hosted Postgres database, reached over its PostgREST API
//! - **memory**: Process-local tables for development and tests
//!
//! No operation here spans more than one collection. Multi-step writes and
//! their compensating actions live in the domain services.

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::MemoryConnection;
pub use rest::RestConnection;
pub use traits::*;
