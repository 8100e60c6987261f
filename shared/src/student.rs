use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{blank_as_none, null_as_default};

/// Lifecycle status of a student. Also snapshotted on every evolution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
}

impl StudentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Ativo",
            Self::Inactive => "Inativo",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Masculino")]
    Male,
    #[serde(rename = "Feminino")]
    Female,
}

/// Health conditions offered as checkboxes on the enrollment form.
/// Anything outside this vocabulary goes into `other_health_conditions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthCondition {
    #[serde(rename = "Asma")]
    Asthma,
    #[serde(rename = "Coração")]
    Heart,
    #[serde(rename = "Sinusite")]
    Sinusitis,
    #[serde(rename = "Rinite Alérgica")]
    AllergicRhinitis,
    #[serde(rename = "Pressão Alta")]
    HighBloodPressure,
    #[serde(rename = "Complicações Respiratórias")]
    RespiratoryComplications,
}

/// Classes a student can be enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnrolledClass {
    #[serde(rename = "Jiu-jitsu")]
    JiuJitsu,
    #[serde(rename = "Reforço Escolar")]
    SchoolTutoring,
    #[serde(rename = "Reforço da Vida")]
    LifeSkills,
    #[serde(rename = "Inglês")]
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolingLevel {
    #[serde(rename = "Ensino Infantil")]
    EarlyChildhood,
    #[serde(rename = "Ensino Fundamental")]
    Elementary,
    #[serde(rename = "Ensino Médio")]
    HighSchool,
    #[serde(rename = "Ensino Superior")]
    Higher,
}

/// Every field staff fill in on the enrollment form.
///
/// Matricula and age are deliberately absent: both are assigned by the backend on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(rename = "nome_completo")]
    pub full_name: String,
    #[serde(rename = "genero")]
    pub gender: Gender,
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub rg: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    /// Defaults to the day of creation when left empty
    #[serde(rename = "data_inscricao", default, deserialize_with = "blank_as_none")]
    pub enrollment_date: Option<NaiveDate>,
    pub status: StudentStatus,

    #[serde(rename = "nome_mae", default)]
    pub mother_name: Option<String>,
    #[serde(rename = "rg_mae", default)]
    pub mother_rg: Option<String>,
    #[serde(rename = "cpf_mae", default)]
    pub mother_cpf: Option<String>,
    #[serde(rename = "telefone_mae", default)]
    pub mother_phone: Option<String>,
    #[serde(rename = "nome_pai", default)]
    pub father_name: Option<String>,
    #[serde(rename = "rg_pai", default)]
    pub father_rg: Option<String>,
    #[serde(rename = "cpf_pai", default)]
    pub father_cpf: Option<String>,
    #[serde(rename = "telefone_pai", default)]
    pub father_phone: Option<String>,

    #[serde(rename = "bairro", default)]
    pub neighborhood: Option<String>,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(rename = "cep", default)]
    pub postal_code: Option<String>,
    #[serde(rename = "numero", default)]
    pub street_number: Option<String>,

    #[serde(rename = "escolaridade", default, deserialize_with = "blank_as_none")]
    pub schooling: Option<SchoolingLevel>,
    #[serde(rename = "escola", default)]
    pub school: Option<String>,
    #[serde(rename = "serie", default)]
    pub grade: Option<String>,
    #[serde(rename = "turno", default)]
    pub shift: Option<String>,

    #[serde(rename = "doencas", default, deserialize_with = "null_as_default")]
    pub health_conditions: BTreeSet<HealthCondition>,
    #[serde(rename = "outras_doencas", default)]
    pub other_health_conditions: Option<String>,
    #[serde(rename = "aulas_matriculadas", default, deserialize_with = "null_as_default")]
    pub enrolled_classes: BTreeSet<EnrolledClass>,
}

impl StudentProfile {
    /// Minimal profile with only the required fields filled in.
    pub fn new(full_name: impl Into<String>, gender: Gender, birth_date: NaiveDate) -> Self {
        Self {
            full_name: full_name.into(),
            gender,
            birth_date,
            rg: None,
            cpf: None,
            enrollment_date: None,
            status: StudentStatus::Active,
            mother_name: None,
            mother_rg: None,
            mother_cpf: None,
            mother_phone: None,
            father_name: None,
            father_rg: None,
            father_cpf: None,
            father_phone: None,
            neighborhood: None,
            city: None,
            postal_code: None,
            street_number: None,
            schooling: None,
            school: None,
            grade: None,
            shift: None,
            health_conditions: BTreeSet::new(),
            other_health_conditions: None,
            enrolled_classes: BTreeSet::new(),
        }
    }
}

/// The row written to the `students` table: the profile plus the backend-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// 4-digit zero-padded enrollment number
    pub matricula: String,
    /// Whole years since birth, recomputed on every save
    #[serde(rename = "idade", default)]
    pub age: Option<i32>,
    #[serde(flatten)]
    pub profile: StudentProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(flatten)]
    pub record: StudentRecord,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn status(&self) -> StudentStatus {
        self.record.profile.status
    }

    pub fn full_name(&self) -> &str {
        &self.record.profile.full_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

/// Head counts shown on the students dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStatistics {
    pub total_students: usize,
    pub total_active: usize,
    pub total_inactive: usize,
    pub total_male: usize,
    pub total_female: usize,
}
