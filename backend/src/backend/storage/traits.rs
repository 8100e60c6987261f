//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use shared::{
    EvolutionEntry, EvolutionRecord, FinancialTransaction, Student, StudentRecord,
    TransactionHeader, TransactionItem, TransactionItemRecord, TransactionRecord,
};

/// The four collections held by the store, named as the store knows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Students,
    EvolutionRecords,
    FinancialTransactions,
    TransactionItems,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::EvolutionRecords => "evolution_records",
            Self::FinancialTransactions => "financial_transactions",
            Self::TransactionItems => "transaction_items",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for updating a transaction header.
///
/// `total_value` is only sent when the item set is being replaced as well.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(flatten)]
    pub header: TransactionHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
}

/// Trait defining the interface for student storage operations
#[async_trait]
pub trait StudentStorage: Send + Sync {
    /// List all students, most recently created first
    async fn list_students(&self) -> Result<Vec<Student>>;

    /// Retrieve a specific student by ID
    async fn get_student(&self, student_id: &str) -> Result<Option<Student>>;

    /// The greatest matricula under descending string order.
    /// Zero padding makes this the numeric maximum up to "9999".
    async fn get_highest_matricula(&self) -> Result<Option<String>>;

    /// Store a new student and return the row as the store saw it
    async fn store_student(&self, record: &StudentRecord) -> Result<Student>;

    /// Overwrite a student's row. Returns `None` when no row has this ID
    async fn update_student(&self, student_id: &str, record: &StudentRecord)
        -> Result<Option<Student>>;

    /// Hard delete. Returns true if a row was removed
    async fn delete_student(&self, student_id: &str) -> Result<bool>;
}

/// Trait defining the interface for evolution record storage operations
#[async_trait]
pub trait EvolutionStorage: Send + Sync {
    /// List a student's records ordered by record date, newest first
    async fn list_evolution_records(&self, student_id: &str) -> Result<Vec<EvolutionRecord>>;

    async fn get_evolution_record(&self, record_id: &str) -> Result<Option<EvolutionRecord>>;

    async fn store_evolution_record(&self, entry: &EvolutionEntry) -> Result<EvolutionRecord>;

    async fn update_evolution_record(
        &self,
        record_id: &str,
        entry: &EvolutionEntry,
    ) -> Result<Option<EvolutionRecord>>;

    async fn delete_evolution_record(&self, record_id: &str) -> Result<bool>;

    /// Delete every record attached to a student, returning how many went away
    async fn delete_student_evolution_records(&self, student_id: &str) -> Result<u32>;
}

/// Trait defining the interface for financial transaction header storage
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// List all transactions, most recently created first
    async fn list_transactions(&self) -> Result<Vec<FinancialTransaction>>;

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<FinancialTransaction>>;

    /// Fetch only the `total_value` column of every transaction
    async fn list_total_values(&self) -> Result<Vec<f64>>;

    async fn store_transaction(&self, record: &TransactionRecord) -> Result<FinancialTransaction>;

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<Option<FinancialTransaction>>;

    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool>;
}

/// Trait defining the interface for transaction line item storage
#[async_trait]
pub trait TransactionItemStorage: Send + Sync {
    /// List a transaction's items in creation order
    async fn list_items(&self, transaction_id: &str) -> Result<Vec<TransactionItem>>;

    /// Insert a batch of items in a single call
    async fn store_items(&self, items: &[TransactionItemRecord]) -> Result<Vec<TransactionItem>>;

    /// Delete every item of a transaction, returning how many went away
    async fn delete_items(&self, transaction_id: &str) -> Result<u32>;
}

/// Server-side sequence used for transaction numbers
#[async_trait]
pub trait SequenceStorage: Send + Sync {
    async fn next_transaction_number(&self) -> Result<String>;
}

/// Trait defining the interface for storage connections
///
/// A connection is built once at process start and acts as the factory for every
/// repository the domain layer needs. Swapping the connection type swaps the backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type StudentRepository: StudentStorage + Clone + 'static;
    type EvolutionRepository: EvolutionStorage + Clone + 'static;
    type TransactionRepository: TransactionStorage + Clone + 'static;
    type TransactionItemRepository: TransactionItemStorage + Clone + 'static;
    type SequenceRepository: SequenceStorage + Clone + 'static;

    fn create_student_repository(&self) -> Self::StudentRepository;
    fn create_evolution_repository(&self) -> Self::EvolutionRepository;
    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_transaction_item_repository(&self) -> Self::TransactionItemRepository;
    fn create_sequence_repository(&self) -> Self::SequenceRepository;
}
