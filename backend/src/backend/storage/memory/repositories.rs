use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    EvolutionEntry, EvolutionRecord, FinancialTransaction, Student, StudentRecord, TransactionItem,
    TransactionItemRecord, TransactionRecord,
};
use uuid::Uuid;

use super::MemoryConnection;
use crate::backend::storage::traits::{
    EvolutionStorage, SequenceStorage, StudentStorage, Table, TransactionItemStorage,
    TransactionStorage, TransactionUpdate,
};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct MemoryStudentRepository {
    connection: MemoryConnection,
}

impl MemoryStudentRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl StudentStorage for MemoryStudentRepository {
    async fn list_students(&self) -> Result<Vec<Student>> {
        self.connection.with_table(Table::Students, |tables| {
            tables.students.iter().rev().cloned().collect()
        })
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        self.connection.with_table(Table::Students, |tables| {
            tables.students.iter().find(|s| s.id == student_id).cloned()
        })
    }

    async fn get_highest_matricula(&self) -> Result<Option<String>> {
        self.connection.with_table(Table::Students, |tables| {
            tables
                .students
                .iter()
                .map(|s| &s.record.matricula)
                .max()
                .cloned()
        })
    }

    async fn store_student(&self, record: &StudentRecord) -> Result<Student> {
        self.connection.with_table(Table::Students, |tables| {
            let now = Utc::now();
            let student = Student {
                id: new_id(),
                record: record.clone(),
                created_at: now,
                updated_at: Some(now),
            };
            tables.students.push(student.clone());
            student
        })
    }

    async fn update_student(
        &self,
        student_id: &str,
        record: &StudentRecord,
    ) -> Result<Option<Student>> {
        self.connection.with_table(Table::Students, |tables| {
            tables
                .students
                .iter_mut()
                .find(|s| s.id == student_id)
                .map(|student| {
                    student.record = record.clone();
                    student.updated_at = Some(Utc::now());
                    student.clone()
                })
        })
    }

    async fn delete_student(&self, student_id: &str) -> Result<bool> {
        self.connection.with_table(Table::Students, |tables| {
            let before = tables.students.len();
            tables.students.retain(|s| s.id != student_id);
            tables.students.len() != before
        })
    }
}

#[derive(Clone)]
pub struct MemoryEvolutionRepository {
    connection: MemoryConnection,
}

impl MemoryEvolutionRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl EvolutionStorage for MemoryEvolutionRepository {
    async fn list_evolution_records(&self, student_id: &str) -> Result<Vec<EvolutionRecord>> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            let mut records: Vec<EvolutionRecord> = tables
                .evolution_records
                .iter()
                .rev()
                .filter(|r| r.entry.student_id == student_id)
                .cloned()
                .collect();
            // Stable, so same-day records stay newest first
            records.sort_by(|a, b| b.entry.date.cmp(&a.entry.date));
            records
        })
    }

    async fn get_evolution_record(&self, record_id: &str) -> Result<Option<EvolutionRecord>> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            tables
                .evolution_records
                .iter()
                .find(|r| r.id == record_id)
                .cloned()
        })
    }

    async fn store_evolution_record(&self, entry: &EvolutionEntry) -> Result<EvolutionRecord> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            let now = Utc::now();
            let record = EvolutionRecord {
                id: new_id(),
                entry: entry.clone(),
                created_at: now,
                updated_at: Some(now),
            };
            tables.evolution_records.push(record.clone());
            record
        })
    }

    async fn update_evolution_record(
        &self,
        record_id: &str,
        entry: &EvolutionEntry,
    ) -> Result<Option<EvolutionRecord>> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            tables
                .evolution_records
                .iter_mut()
                .find(|r| r.id == record_id)
                .map(|record| {
                    record.entry = entry.clone();
                    record.updated_at = Some(Utc::now());
                    record.clone()
                })
        })
    }

    async fn delete_evolution_record(&self, record_id: &str) -> Result<bool> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            let before = tables.evolution_records.len();
            tables.evolution_records.retain(|r| r.id != record_id);
            tables.evolution_records.len() != before
        })
    }

    async fn delete_student_evolution_records(&self, student_id: &str) -> Result<u32> {
        self.connection.with_table(Table::EvolutionRecords, |tables| {
            let before = tables.evolution_records.len();
            tables
                .evolution_records
                .retain(|r| r.entry.student_id != student_id);
            (before - tables.evolution_records.len()) as u32
        })
    }
}

#[derive(Clone)]
pub struct MemoryTransactionRepository {
    connection: MemoryConnection,
}

impl MemoryTransactionRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TransactionStorage for MemoryTransactionRepository {
    async fn list_transactions(&self) -> Result<Vec<FinancialTransaction>> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                tables.transactions.iter().rev().cloned().collect()
            })
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<FinancialTransaction>> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                tables
                    .transactions
                    .iter()
                    .find(|t| t.id == transaction_id)
                    .cloned()
            })
    }

    async fn list_total_values(&self) -> Result<Vec<f64>> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                tables
                    .transactions
                    .iter()
                    .map(|t| t.record.total_value)
                    .collect()
            })
    }

    async fn store_transaction(&self, record: &TransactionRecord) -> Result<FinancialTransaction> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                let now = Utc::now();
                let transaction = FinancialTransaction {
                    id: new_id(),
                    record: record.clone(),
                    created_at: now,
                    updated_at: Some(now),
                };
                tables.transactions.push(transaction.clone());
                transaction
            })
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<Option<FinancialTransaction>> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                tables
                    .transactions
                    .iter_mut()
                    .find(|t| t.id == transaction_id)
                    .map(|transaction| {
                        transaction.record.header = update.header.clone();
                        if let Some(total_value) = update.total_value {
                            transaction.record.total_value = total_value;
                        }
                        transaction.updated_at = Some(Utc::now());
                        transaction.clone()
                    })
            })
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        self.connection
            .with_table(Table::FinancialTransactions, |tables| {
                let before = tables.transactions.len();
                tables.transactions.retain(|t| t.id != transaction_id);
                tables.transactions.len() != before
            })
    }
}

#[derive(Clone)]
pub struct MemoryTransactionItemRepository {
    connection: MemoryConnection,
}

impl MemoryTransactionItemRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TransactionItemStorage for MemoryTransactionItemRepository {
    async fn list_items(&self, transaction_id: &str) -> Result<Vec<TransactionItem>> {
        self.connection.with_table(Table::TransactionItems, |tables| {
            tables
                .items
                .iter()
                .filter(|i| i.transaction_id == transaction_id)
                .cloned()
                .collect()
        })
    }

    async fn store_items(&self, items: &[TransactionItemRecord]) -> Result<Vec<TransactionItem>> {
        self.connection
            .with_table(Table::TransactionItems, |tables| {
                // Mirror the remote foreign key on transaction_id
                if let Some(orphan) = items.iter().find(|item| {
                    !tables
                        .transactions
                        .iter()
                        .any(|t| t.id == item.transaction_id)
                }) {
                    bail!(
                        "insert on transaction_items violates foreign key: transaction {} not found",
                        orphan.transaction_id
                    );
                }

                let now = Utc::now();
                let stored: Vec<TransactionItem> = items
                    .iter()
                    .map(|item| TransactionItem {
                        id: new_id(),
                        transaction_id: item.transaction_id.clone(),
                        line: item.line.clone(),
                        created_at: now,
                    })
                    .collect();
                tables.items.extend(stored.iter().cloned());
                Ok(stored)
            })?
    }

    async fn delete_items(&self, transaction_id: &str) -> Result<u32> {
        self.connection.with_table(Table::TransactionItems, |tables| {
            let before = tables.items.len();
            tables.items.retain(|i| i.transaction_id != transaction_id);
            (before - tables.items.len()) as u32
        })
    }
}

#[derive(Clone)]
pub struct MemorySequenceRepository {
    connection: MemoryConnection,
}

impl MemorySequenceRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SequenceStorage for MemorySequenceRepository {
    async fn next_transaction_number(&self) -> Result<String> {
        self.connection.with_sequence(|tables| {
            tables.transaction_sequence += 1;
            format!("{:06}", tables.transaction_sequence)
        })
    }
}
