//! Sequential identifiers: student matriculas and transaction numbers.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::backend::storage::{Connection, SequenceStorage, StudentStorage};

pub const FIRST_MATRICULA: &str = "0001";

/// Largest matricula that still sorts correctly as a 4-character string
const MATRICULA_CEILING: u32 = 9999;

/// The matricula that follows `highest`, zero-padded to 4 digits.
///
/// A missing or non-numeric `highest` restarts at `"0001"`. Past `"9999"` the
/// number keeps growing with 5+ digits.
pub fn next_matricula_after(highest: Option<&str>) -> String {
    let Some(current) = highest.and_then(|m| m.trim().parse::<u32>().ok()) else {
        return FIRST_MATRICULA.to_string();
    };

    let next = current.saturating_add(1);
    if next > MATRICULA_CEILING {
        warn!(
            "Matricula {} exceeds 4 digits; highest-matricula lookups sort as text and may repeat numbers",
            next
        );
    }
    format!("{:04}", next)
}

#[derive(Clone)]
pub struct NumberingService<C: Connection> {
    student_repository: C::StudentRepository,
    sequence_repository: C::SequenceRepository,
}

impl<C: Connection> NumberingService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            sequence_repository: connection.create_sequence_repository(),
        }
    }

    /// Next free matricula. Never fails: a store error falls back to `"0001"`.
    pub async fn next_matricula(&self) -> String {
        match self.student_repository.get_highest_matricula().await {
            Ok(highest) => {
                let next = next_matricula_after(highest.as_deref());
                info!("Next matricula after {:?} is {}", highest, next);
                next
            }
            Err(e) => {
                error!("Failed to look up the highest matricula, starting at {}: {:#}", FIRST_MATRICULA, e);
                FIRST_MATRICULA.to_string()
            }
        }
    }

    /// Next transaction number from the store's sequence. Errors propagate so
    /// that no transaction is ever created without a number.
    pub async fn next_transaction_number(&self) -> Result<String> {
        let number = self
            .sequence_repository
            .next_transaction_number()
            .await
            .context("Could not obtain a transaction number")?;
        info!("Generated transaction number {}", number);
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryConnection, Table};
    use chrono::NaiveDate;
    use shared::{Gender, StudentProfile, StudentRecord};

    #[test]
    fn empty_store_starts_at_one() {
        assert_eq!(next_matricula_after(None), "0001");
    }

    #[test]
    fn increments_and_repads() {
        assert_eq!(next_matricula_after(Some("0047")), "0048");
        assert_eq!(next_matricula_after(Some("0099")), "0100");
        assert_eq!(next_matricula_after(Some("0")), "0001");
    }

    #[test]
    fn non_numeric_restarts_at_one() {
        assert_eq!(next_matricula_after(Some("A12")), "0001");
        assert_eq!(next_matricula_after(Some("")), "0001");
    }

    #[test]
    fn grows_past_four_digits() {
        assert_eq!(next_matricula_after(Some("9999")), "10000");
    }

    async fn seed_student(connection: &MemoryConnection, matricula: &str) {
        let record = StudentRecord {
            matricula: matricula.to_string(),
            age: None,
            profile: StudentProfile::new(
                "Aluno",
                Gender::Male,
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            ),
        };
        connection
            .create_student_repository()
            .store_student(&record)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn next_matricula_reads_the_store() {
        let connection = MemoryConnection::new();
        let service = NumberingService::new(Arc::new(connection.clone()));
        assert_eq!(service.next_matricula().await, "0001");

        seed_student(&connection, "0046").await;
        seed_student(&connection, "0047").await;
        assert_eq!(service.next_matricula().await, "0048");
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_first_matricula() {
        let connection = MemoryConnection::new();
        seed_student(&connection, "0047").await;
        connection.set_offline(Table::Students, true).unwrap();

        let service = NumberingService::new(Arc::new(connection));
        assert_eq!(service.next_matricula().await, "0001");
    }

    #[tokio::test]
    async fn transaction_number_failure_propagates() {
        let connection = MemoryConnection::new();
        connection.set_sequence_offline(true).unwrap();

        let service = NumberingService::new(Arc::new(connection));
        assert!(service.next_transaction_number().await.is_err());
    }
}
