use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use log::{info, warn};
use shared::{EvolutionEntry, EvolutionListResponse, EvolutionRecord, EvolutionRequest};

use crate::backend::domain::validation::validate_evolution_description;
use crate::backend::storage::{Connection, EvolutionStorage, StudentStorage};

/// Service for a student's dated progress notes
#[derive(Clone)]
pub struct EvolutionService<C: Connection> {
    evolution_repository: C::EvolutionRepository,
    student_repository: C::StudentRepository,
}

impl<C: Connection> EvolutionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            evolution_repository: connection.create_evolution_repository(),
            student_repository: connection.create_student_repository(),
        }
    }

    /// A student's records, newest date first
    pub async fn list_records(&self, student_id: &str) -> Result<EvolutionListResponse> {
        info!("Listing evolution records of student {}", student_id);

        let records = self
            .evolution_repository
            .list_evolution_records(student_id)
            .await?;

        info!("Found {} evolution records", records.len());

        Ok(EvolutionListResponse { records })
    }

    pub async fn get_record(&self, record_id: &str) -> Result<Option<EvolutionRecord>> {
        info!("Getting evolution record: {}", record_id);

        let record = self
            .evolution_repository
            .get_evolution_record(record_id)
            .await?;

        if record.is_none() {
            warn!("Evolution record not found: {}", record_id);
        }

        Ok(record)
    }

    /// Returns `None` when the student does not exist
    pub async fn create_record(
        &self,
        student_id: &str,
        request: EvolutionRequest,
    ) -> Result<Option<EvolutionRecord>> {
        info!("Creating evolution record for student {}", student_id);

        let entry = Self::entry_from_request(student_id.to_string(), request)?;

        if self.student_repository.get_student(student_id).await?.is_none() {
            warn!("Student not found for evolution record: {}", student_id);
            return Ok(None);
        }

        let record = self
            .evolution_repository
            .store_evolution_record(&entry)
            .await?;

        info!("Created evolution record {}", record.id);

        Ok(Some(record))
    }

    /// Returns `None` when the record does not exist. The owning student never changes.
    pub async fn update_record(
        &self,
        record_id: &str,
        request: EvolutionRequest,
    ) -> Result<Option<EvolutionRecord>> {
        info!("Updating evolution record: {}", record_id);

        validate_evolution_description(&request.description)?;

        let Some(existing) = self
            .evolution_repository
            .get_evolution_record(record_id)
            .await?
        else {
            warn!("Evolution record not found for update: {}", record_id);
            return Ok(None);
        };

        let entry = Self::entry_from_request(existing.entry.student_id, request)?;
        let record = self
            .evolution_repository
            .update_evolution_record(record_id, &entry)
            .await?;

        if record.is_some() {
            info!("Updated evolution record {}", record_id);
        }

        Ok(record)
    }

    pub async fn delete_record(&self, record_id: &str) -> Result<bool> {
        info!("Deleting evolution record: {}", record_id);

        let deleted = self
            .evolution_repository
            .delete_evolution_record(record_id)
            .await?;

        if deleted {
            info!("Deleted evolution record {}", record_id);
        } else {
            warn!("Evolution record not found for delete: {}", record_id);
        }

        Ok(deleted)
    }

    fn entry_from_request(student_id: String, request: EvolutionRequest) -> Result<EvolutionEntry> {
        validate_evolution_description(&request.description)?;

        Ok(EvolutionEntry {
            student_id,
            date: request.date.unwrap_or_else(|| Local::now().date_naive()),
            description: request.description.trim().to_string(),
            status: request.status,
            kind: request.kind,
        })
    }
}
