//! Required-field checks applied before anything is sent to the store.
//!
//! Only presence is checked. Formats (CPF, phone numbers, postal codes) are
//! stored exactly as typed.

use shared::{ItemLine, StudentProfile, TransactionHeader};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Nome completo é obrigatório.")]
    MissingStudentName,
    #[error("Descrição é obrigatória.")]
    MissingEvolutionDescription,
    #[error("Nome da empresa é obrigatório.")]
    MissingCompanyName,
    #[error("Número da nota é obrigatório.")]
    MissingInvoiceNumber,
    /// `position` is 1-based, as shown on the form
    #[error("Nome do item {position} é obrigatório.")]
    MissingItemName { position: usize },
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_student(profile: &StudentProfile) -> Result<(), ValidationError> {
    if is_blank(&profile.full_name) {
        return Err(ValidationError::MissingStudentName);
    }
    Ok(())
}

pub fn validate_evolution_description(description: &str) -> Result<(), ValidationError> {
    if is_blank(description) {
        return Err(ValidationError::MissingEvolutionDescription);
    }
    Ok(())
}

pub fn validate_transaction_header(header: &TransactionHeader) -> Result<(), ValidationError> {
    if is_blank(&header.company_name) {
        return Err(ValidationError::MissingCompanyName);
    }
    if is_blank(&header.invoice_number) {
        return Err(ValidationError::MissingInvoiceNumber);
    }
    Ok(())
}

pub fn validate_items(items: &[ItemLine]) -> Result<(), ValidationError> {
    match items.iter().position(|item| is_blank(&item.item_name)) {
        Some(index) => Err(ValidationError::MissingItemName {
            position: index + 1,
        }),
        None => Ok(()),
    }
}
