use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{blank_as_none, null_as_default};
use crate::student::StudentStatus;

/// Whether an evolution record was written by staff or generated on a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvolutionKind {
    #[default]
    #[serde(rename = "evolucao")]
    Note,
    #[serde(rename = "mudanca_status")]
    StatusChange,
}

/// Row written to the `evolution_records` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEntry {
    pub student_id: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "descricao")]
    pub description: String,
    pub status: StudentStatus,
    #[serde(rename = "tipo", default, deserialize_with = "null_as_default")]
    pub kind: EvolutionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRecord {
    pub id: String,
    #[serde(flatten)]
    pub entry: EvolutionEntry,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of the create/edit evolution form. The owning student comes from the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRequest {
    /// Defaults to today
    #[serde(rename = "data", default, deserialize_with = "blank_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(rename = "tipo", default)]
    pub kind: EvolutionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionListResponse {
    pub records: Vec<EvolutionRecord>,
}
