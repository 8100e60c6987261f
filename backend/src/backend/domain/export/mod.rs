//! Printable rendering of a transaction: pt-BR formatting, page layout and PDF output.

pub mod format;
pub mod layout;
pub mod pdf;

pub use format::{format_currency, format_date, format_quantity, format_timestamp};
pub use layout::{export_file_name, layout_transaction, DocumentLayout};
pub use pdf::render_pdf;
