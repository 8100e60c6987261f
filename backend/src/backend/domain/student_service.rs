use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use shared::{
    Gender, Student, StudentListResponse, StudentProfile, StudentRecord, StudentResponse,
    StudentStatistics, StudentStatus,
};

use crate::backend::domain::age::calculate_age;
use crate::backend::domain::numbering::NumberingService;
use crate::backend::domain::search::filter_students;
use crate::backend::domain::status_transition::StatusTransitionLogger;
use crate::backend::domain::validation::validate_student;
use crate::backend::storage::{Connection, EvolutionStorage, StudentStorage};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Service for enrolling and maintaining students
#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: C::StudentRepository,
    evolution_repository: C::EvolutionRepository,
    numbering: NumberingService<C>,
    status_logger: StatusTransitionLogger<C>,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            evolution_repository: connection.create_evolution_repository(),
            numbering: NumberingService::new(connection.clone()),
            status_logger: StatusTransitionLogger::new(connection),
        }
    }

    /// All students, most recently enrolled first
    pub async fn list_students(&self) -> Result<StudentListResponse> {
        info!("Listing all students");

        let students = self.student_repository.list_students().await?;

        info!("Found {} students", students.len());

        Ok(StudentListResponse { students })
    }

    /// Students whose name, CPF or matricula contains `term`
    pub async fn search_students(&self, term: &str) -> Result<StudentListResponse> {
        info!("Searching students for {:?}", term);

        let students = filter_students(self.student_repository.list_students().await?, term);

        info!("{} students match {:?}", students.len(), term);

        Ok(StudentListResponse { students })
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        info!("Getting student: {}", student_id);

        let student = self.student_repository.get_student(student_id).await?;

        if student.is_none() {
            warn!("Student not found: {}", student_id);
        }

        Ok(student)
    }

    /// Enroll a new student. Matricula, age and (when empty) enrollment date are assigned here.
    pub async fn create_student(&self, mut profile: StudentProfile) -> Result<StudentResponse> {
        info!("Creating student: {}", profile.full_name);

        validate_student(&profile)?;

        let today = today();
        profile.full_name = profile.full_name.trim().to_string();
        profile.enrollment_date.get_or_insert(today);

        let record = StudentRecord {
            matricula: self.numbering.next_matricula().await,
            age: Some(calculate_age(profile.birth_date, today)),
            profile,
        };

        let student = self.student_repository.store_student(&record).await?;

        info!(
            "Created student {} with matricula {} and ID {}",
            student.full_name(),
            student.record.matricula,
            student.id
        );

        Ok(StudentResponse {
            student,
            success_message: "Aluno cadastrado com sucesso".to_string(),
        })
    }

    /// Overwrite a student's profile. Returns `None` when the student does not exist.
    ///
    /// The matricula never changes and the age is recomputed. Moving an active
    /// student to inactive also writes an automatic evolution record.
    pub async fn update_student(
        &self,
        student_id: &str,
        mut profile: StudentProfile,
    ) -> Result<Option<StudentResponse>> {
        info!("Updating student: {}", student_id);

        validate_student(&profile)?;

        let Some(existing) = self.student_repository.get_student(student_id).await? else {
            warn!("Student not found for update: {}", student_id);
            return Ok(None);
        };
        let previous_status = existing.status();

        let today = today();
        profile.full_name = profile.full_name.trim().to_string();
        if profile.enrollment_date.is_none() {
            profile.enrollment_date = existing.record.profile.enrollment_date.or(Some(today));
        }

        let record = StudentRecord {
            matricula: existing.record.matricula,
            age: Some(calculate_age(profile.birth_date, today)),
            profile,
        };

        let Some(student) = self
            .student_repository
            .update_student(student_id, &record)
            .await?
        else {
            warn!("Student disappeared during update: {}", student_id);
            return Ok(None);
        };

        self.status_logger
            .record_transition(student_id, previous_status, student.status(), today)
            .await;

        info!("Updated student {} with ID {}", student.full_name(), student.id);

        Ok(Some(StudentResponse {
            student,
            success_message: "Aluno atualizado com sucesso".to_string(),
        }))
    }

    /// Delete a student and its evolution records. Returns false when the student does not exist.
    ///
    /// Evolution records go first; if that fails the student is left untouched.
    pub async fn delete_student(&self, student_id: &str) -> Result<bool> {
        info!("Deleting student: {}", student_id);

        let Some(student) = self.student_repository.get_student(student_id).await? else {
            warn!("Student not found for delete: {}", student_id);
            return Ok(false);
        };

        let removed = self
            .evolution_repository
            .delete_student_evolution_records(student_id)
            .await
            .with_context(|| {
                format!("Student {student_id} kept: its evolution records could not be deleted")
            })?;

        let deleted = self.student_repository.delete_student(student_id).await?;

        info!(
            "Deleted student {} with ID {} and {} evolution records",
            student.full_name(),
            student_id,
            removed
        );

        Ok(deleted)
    }

    /// Head counts for the dashboard
    pub async fn get_statistics(&self) -> Result<StudentStatistics> {
        info!("Computing student statistics");

        let students = self.student_repository.list_students().await?;
        let mut stats = StudentStatistics {
            total_students: students.len(),
            ..Default::default()
        };

        for student in &students {
            match student.status() {
                StudentStatus::Active => stats.total_active += 1,
                StudentStatus::Inactive => stats.total_inactive += 1,
            }
            match student.record.profile.gender {
                Gender::Male => stats.total_male += 1,
                Gender::Female => stats.total_female += 1,
            }
        }

        Ok(stats)
    }
}
