use std::sync::Arc;

use chrono::NaiveDate;
use log::{error, info};
use shared::{EvolutionEntry, EvolutionKind, StudentStatus};

use crate::backend::storage::{Connection, EvolutionStorage};

/// Description written on the automatic record until staff fill in the reason
pub const INACTIVATION_PLACEHOLDER: &str = "Aluno inativado. Motivo: (Aguardando preenchimento)";

/// Only Ativo → Inativo is audited
pub fn is_inactivation(previous: StudentStatus, next: StudentStatus) -> bool {
    previous == StudentStatus::Active && next == StudentStatus::Inactive
}

/// Writes the automatic evolution record when a student is inactivated.
///
/// The write is best-effort: a failure is logged and the student update that
/// triggered it still counts as successful.
#[derive(Clone)]
pub struct StatusTransitionLogger<C: Connection> {
    evolution_repository: C::EvolutionRepository,
}

impl<C: Connection> StatusTransitionLogger<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            evolution_repository: connection.create_evolution_repository(),
        }
    }

    /// Returns true when an audit record was written
    pub async fn record_transition(
        &self,
        student_id: &str,
        previous: StudentStatus,
        next: StudentStatus,
        today: NaiveDate,
    ) -> bool {
        if !is_inactivation(previous, next) {
            return false;
        }

        let entry = EvolutionEntry {
            student_id: student_id.to_string(),
            date: today,
            description: INACTIVATION_PLACEHOLDER.to_string(),
            status: StudentStatus::Inactive,
            kind: EvolutionKind::StatusChange,
        };

        match self.evolution_repository.store_evolution_record(&entry).await {
            Ok(record) => {
                info!(
                    "Logged inactivation of student {} as evolution record {}",
                    student_id, record.id
                );
                true
            }
            Err(e) => {
                error!(
                    "Failed to log inactivation of student {}: {:#}",
                    student_id, e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryConnection, Table};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    #[test]
    fn only_active_to_inactive_counts() {
        use StudentStatus::*;
        assert!(is_inactivation(Active, Inactive));
        assert!(!is_inactivation(Inactive, Active));
        assert!(!is_inactivation(Active, Active));
        assert!(!is_inactivation(Inactive, Inactive));
    }

    #[tokio::test]
    async fn inactivation_writes_one_status_change_record() {
        let connection = MemoryConnection::new();
        let logger = StatusTransitionLogger::new(Arc::new(connection.clone()));

        let written = logger
            .record_transition("s1", StudentStatus::Active, StudentStatus::Inactive, today())
            .await;
        assert!(written);

        let records = connection
            .create_evolution_repository()
            .list_evolution_records("s1")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        let entry = &records[0].entry;
        assert_eq!(entry.kind, EvolutionKind::StatusChange);
        assert_eq!(entry.status, StudentStatus::Inactive);
        assert_eq!(entry.description, INACTIVATION_PLACEHOLDER);
        assert_eq!(entry.date, today());
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let connection = MemoryConnection::new();
        connection.set_offline(Table::EvolutionRecords, true).unwrap();
        let logger = StatusTransitionLogger::new(Arc::new(connection));

        let written = logger
            .record_transition("s1", StudentStatus::Active, StudentStatus::Inactive, today())
            .await;
        assert!(!written);
    }
}
