use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared::{
    EvolutionEntry, EvolutionRecord, FinancialTransaction, Student, StudentRecord, TransactionItem,
    TransactionItemRecord, TransactionRecord,
};

use super::client::{Order, Query, RestClient};
use crate::backend::storage::traits::{
    EvolutionStorage, SequenceStorage, StudentStorage, Table, TransactionItemStorage,
    TransactionStorage, TransactionUpdate,
};

const TRANSACTION_NUMBER_FUNCTION: &str = "generate_transaction_number";

#[derive(Deserialize)]
struct MatriculaRow {
    matricula: Option<String>,
}

#[derive(Deserialize)]
struct TotalValueRow {
    total_value: f64,
}

fn single_row<T>(rows: Vec<T>, table: Table) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow!("store returned no row after writing to {table}"))
}

/// Repository for the `students` table
#[derive(Clone)]
pub struct RestStudentRepository {
    client: RestClient,
}

impl RestStudentRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StudentStorage for RestStudentRepository {
    async fn list_students(&self) -> Result<Vec<Student>> {
        let query = Query::new().order("created_at", Order::Descending);
        self.client
            .select(Table::Students, &query)
            .await
            .context("Failed to list students")
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let query = Query::new().eq("id", student_id).limit(1);
        let rows: Vec<Student> = self
            .client
            .select(Table::Students, &query)
            .await
            .with_context(|| format!("Failed to fetch student {student_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn get_highest_matricula(&self) -> Result<Option<String>> {
        let query = Query::new()
            .select("matricula")
            .order("matricula", Order::Descending)
            .limit(1);
        let rows: Vec<MatriculaRow> = self
            .client
            .select(Table::Students, &query)
            .await
            .context("Failed to fetch the highest matricula")?;
        Ok(rows.into_iter().next().and_then(|row| row.matricula))
    }

    async fn store_student(&self, record: &StudentRecord) -> Result<Student> {
        let rows = self
            .client
            .insert(Table::Students, &[record])
            .await
            .context("Failed to insert student")?;
        single_row(rows, Table::Students)
    }

    async fn update_student(
        &self,
        student_id: &str,
        record: &StudentRecord,
    ) -> Result<Option<Student>> {
        let query = Query::new().eq("id", student_id);
        let rows: Vec<Student> = self
            .client
            .update(Table::Students, &query, record)
            .await
            .with_context(|| format!("Failed to update student {student_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn delete_student(&self, student_id: &str) -> Result<bool> {
        let query = Query::new().eq("id", student_id);
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(Table::Students, &query)
            .await
            .with_context(|| format!("Failed to delete student {student_id}"))?;
        Ok(!rows.is_empty())
    }
}

/// Repository for the `evolution_records` table
#[derive(Clone)]
pub struct RestEvolutionRepository {
    client: RestClient,
}

impl RestEvolutionRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvolutionStorage for RestEvolutionRepository {
    async fn list_evolution_records(&self, student_id: &str) -> Result<Vec<EvolutionRecord>> {
        let query = Query::new()
            .eq("student_id", student_id)
            .order("data", Order::Descending);
        self.client
            .select(Table::EvolutionRecords, &query)
            .await
            .with_context(|| format!("Failed to list evolution records of student {student_id}"))
    }

    async fn get_evolution_record(&self, record_id: &str) -> Result<Option<EvolutionRecord>> {
        let query = Query::new().eq("id", record_id).limit(1);
        let rows: Vec<EvolutionRecord> = self
            .client
            .select(Table::EvolutionRecords, &query)
            .await
            .with_context(|| format!("Failed to fetch evolution record {record_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn store_evolution_record(&self, entry: &EvolutionEntry) -> Result<EvolutionRecord> {
        let rows = self
            .client
            .insert(Table::EvolutionRecords, &[entry])
            .await
            .context("Failed to insert evolution record")?;
        single_row(rows, Table::EvolutionRecords)
    }

    async fn update_evolution_record(
        &self,
        record_id: &str,
        entry: &EvolutionEntry,
    ) -> Result<Option<EvolutionRecord>> {
        let query = Query::new().eq("id", record_id);
        let rows: Vec<EvolutionRecord> = self
            .client
            .update(Table::EvolutionRecords, &query, entry)
            .await
            .with_context(|| format!("Failed to update evolution record {record_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn delete_evolution_record(&self, record_id: &str) -> Result<bool> {
        let query = Query::new().eq("id", record_id);
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(Table::EvolutionRecords, &query)
            .await
            .with_context(|| format!("Failed to delete evolution record {record_id}"))?;
        Ok(!rows.is_empty())
    }

    async fn delete_student_evolution_records(&self, student_id: &str) -> Result<u32> {
        let query = Query::new().eq("student_id", student_id);
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(Table::EvolutionRecords, &query)
            .await
            .with_context(|| format!("Failed to delete evolution records of student {student_id}"))?;
        Ok(rows.len() as u32)
    }
}

/// Repository for the `financial_transactions` table
#[derive(Clone)]
pub struct RestTransactionRepository {
    client: RestClient,
}

impl RestTransactionRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionStorage for RestTransactionRepository {
    async fn list_transactions(&self) -> Result<Vec<FinancialTransaction>> {
        let query = Query::new().order("created_at", Order::Descending);
        self.client
            .select(Table::FinancialTransactions, &query)
            .await
            .context("Failed to list transactions")
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<FinancialTransaction>> {
        let query = Query::new().eq("id", transaction_id).limit(1);
        let rows: Vec<FinancialTransaction> = self
            .client
            .select(Table::FinancialTransactions, &query)
            .await
            .with_context(|| format!("Failed to fetch transaction {transaction_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn list_total_values(&self) -> Result<Vec<f64>> {
        let query = Query::new().select("total_value");
        let rows: Vec<TotalValueRow> = self
            .client
            .select(Table::FinancialTransactions, &query)
            .await
            .context("Failed to fetch transaction totals")?;
        Ok(rows.into_iter().map(|row| row.total_value).collect())
    }

    async fn store_transaction(&self, record: &TransactionRecord) -> Result<FinancialTransaction> {
        let rows = self
            .client
            .insert(Table::FinancialTransactions, &[record])
            .await
            .context("Failed to insert transaction")?;
        single_row(rows, Table::FinancialTransactions)
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<Option<FinancialTransaction>> {
        let query = Query::new().eq("id", transaction_id);
        let rows: Vec<FinancialTransaction> = self
            .client
            .update(Table::FinancialTransactions, &query, update)
            .await
            .with_context(|| format!("Failed to update transaction {transaction_id}"))?;
        Ok(rows.into_iter().next())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        let query = Query::new().eq("id", transaction_id);
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(Table::FinancialTransactions, &query)
            .await
            .with_context(|| format!("Failed to delete transaction {transaction_id}"))?;
        Ok(!rows.is_empty())
    }
}

/// Repository for the `transaction_items` table
#[derive(Clone)]
pub struct RestTransactionItemRepository {
    client: RestClient,
}

impl RestTransactionItemRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionItemStorage for RestTransactionItemRepository {
    async fn list_items(&self, transaction_id: &str) -> Result<Vec<TransactionItem>> {
        let query = Query::new()
            .eq("transaction_id", transaction_id)
            .order("created_at", Order::Ascending);
        self.client
            .select(Table::TransactionItems, &query)
            .await
            .with_context(|| format!("Failed to list items of transaction {transaction_id}"))
    }

    async fn store_items(&self, items: &[TransactionItemRecord]) -> Result<Vec<TransactionItem>> {
        self.client
            .insert(Table::TransactionItems, items)
            .await
            .context("Failed to insert transaction items")
    }

    async fn delete_items(&self, transaction_id: &str) -> Result<u32> {
        let query = Query::new().eq("transaction_id", transaction_id);
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(Table::TransactionItems, &query)
            .await
            .with_context(|| format!("Failed to delete items of transaction {transaction_id}"))?;
        Ok(rows.len() as u32)
    }
}

/// Wraps the `generate_transaction_number` stored procedure
#[derive(Clone)]
pub struct RestSequenceRepository {
    client: RestClient,
}

impl RestSequenceRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SequenceStorage for RestSequenceRepository {
    async fn next_transaction_number(&self) -> Result<String> {
        let value: serde_json::Value = self
            .client
            .rpc(TRANSACTION_NUMBER_FUNCTION, &json!({}))
            .await
            .context("Failed to generate transaction number")?;

        // The procedure may be declared as returning text or an integer
        match value {
            serde_json::Value::String(number) if !number.is_empty() => Ok(number),
            serde_json::Value::Number(number) => Ok(number.to_string()),
            other => Err(anyhow!("unexpected transaction number from store: {other}")),
        }
    }
}
