//! Client-side list filters. Both filters run over an already fetched list and
//! keep its order.

use shared::{FinancialTransaction, Student};

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Case-insensitive substring match on name, CPF or matricula.
/// A blank term keeps every student.
pub fn filter_students(students: Vec<Student>, term: &str) -> Vec<Student> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return students;
    }

    students
        .into_iter()
        .filter(|student| {
            let record = &student.record;
            contains_ignore_case(&record.profile.full_name, &term)
                || record
                    .profile
                    .cpf
                    .as_deref()
                    .is_some_and(|cpf| contains_ignore_case(cpf, &term))
                || contains_ignore_case(&record.matricula, &term)
        })
        .collect()
}

/// Company name or invoice number (case-insensitive), or transaction number.
pub fn filter_transactions(
    transactions: Vec<FinancialTransaction>,
    term: &str,
) -> Vec<FinancialTransaction> {
    let raw = term.trim();
    let term = raw.to_lowercase();
    if term.is_empty() {
        return transactions;
    }

    transactions
        .into_iter()
        .filter(|transaction| {
            let record = &transaction.record;
            contains_ignore_case(&record.header.company_name, &term)
                || contains_ignore_case(&record.header.invoice_number, &term)
                || record.transaction_number.contains(raw)
        })
        .collect()
}
