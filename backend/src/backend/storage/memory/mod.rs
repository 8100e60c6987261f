//! # In-Memory Store
//!
//! A process-local stand-in for the remote store. It is used when no store
//! credentials are configured and by the test suites of the domain and io
//! layers.
//!
//! ## Behavior
//!
//! - Rows get UUID ids and `Utc::now()` timestamps on insert, like the remote store
//! - Listing orders match the remote queries (newest first, items oldest first)
//! - Transaction numbers come from a counter rendered as six zero-padded digits
//! - Any table (and the sequence) can be taken offline to simulate store failures

mod repositories;

pub use repositories::{
    MemoryEvolutionRepository, MemorySequenceRepository, MemoryStudentRepository,
    MemoryTransactionItemRepository, MemoryTransactionRepository,
};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use shared::{EvolutionRecord, FinancialTransaction, Student, TransactionItem};

use crate::backend::storage::traits::{Connection, Table};

#[derive(Debug, Default)]
pub(crate) struct MemoryTables {
    pub students: Vec<Student>,
    pub evolution_records: Vec<EvolutionRecord>,
    pub transactions: Vec<FinancialTransaction>,
    pub items: Vec<TransactionItem>,
    pub transaction_sequence: u64,
    offline: HashSet<Table>,
    sequence_offline: bool,
}

/// Shared handle to the in-memory tables. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call touching `table` fail until switched back
    pub fn set_offline(&self, table: Table, offline: bool) -> Result<()> {
        let mut tables = self.lock()?;
        if offline {
            tables.offline.insert(table);
        } else {
            tables.offline.remove(&table);
        }
        Ok(())
    }

    pub fn set_sequence_offline(&self, offline: bool) -> Result<()> {
        self.lock()?.sequence_offline = offline;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    /// Run `f` against the tables, failing first if `table` is offline
    pub(crate) fn with_table<R>(
        &self,
        table: Table,
        f: impl FnOnce(&mut MemoryTables) -> R,
    ) -> Result<R> {
        let mut tables = self.lock()?;
        if tables.offline.contains(&table) {
            bail!("store unavailable: table {table} is offline");
        }
        Ok(f(&mut tables))
    }

    pub(crate) fn with_sequence<R>(&self, f: impl FnOnce(&mut MemoryTables) -> R) -> Result<R> {
        let mut tables = self.lock()?;
        if tables.sequence_offline {
            bail!("store unavailable: transaction number sequence is offline");
        }
        Ok(f(&mut tables))
    }
}

impl Connection for MemoryConnection {
    type StudentRepository = MemoryStudentRepository;
    type EvolutionRepository = MemoryEvolutionRepository;
    type TransactionRepository = MemoryTransactionRepository;
    type TransactionItemRepository = MemoryTransactionItemRepository;
    type SequenceRepository = MemorySequenceRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        MemoryStudentRepository::new(self.clone())
    }

    fn create_evolution_repository(&self) -> Self::EvolutionRepository {
        MemoryEvolutionRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        MemoryTransactionRepository::new(self.clone())
    }

    fn create_transaction_item_repository(&self) -> Self::TransactionItemRepository {
        MemoryTransactionItemRepository::new(self.clone())
    }

    fn create_sequence_repository(&self) -> Self::SequenceRepository {
        MemorySequenceRepository::new(self.clone())
    }
}
