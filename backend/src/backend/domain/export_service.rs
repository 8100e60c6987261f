//! Export service domain logic for the Avalanche backend.
//!
//! Turns a stored transaction into a downloadable PDF, or writes that PDF
//! into the configured export directory. The io layer only streams the bytes.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::{error, info};
use shared::TransactionWithItems;

use crate::backend::domain::export::{export_file_name, layout_transaction, render_pdf};
use crate::backend::domain::transaction_service::TransactionService;
use crate::backend::storage::Connection;

/// A rendered PDF ready to be sent or saved
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

/// Export service that handles all export-related business logic
#[derive(Clone)]
pub struct ExportService {
    export_dir: PathBuf,
}

impl ExportService {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Render a transaction that is already loaded. No store access.
    pub fn render_transaction(
        &self,
        transaction: &TransactionWithItems,
        generated_at: NaiveDateTime,
    ) -> Result<ExportedDocument> {
        let number = &transaction.transaction.record.transaction_number;
        let layout = layout_transaction(transaction, generated_at);
        let page_count = layout.pages.len();

        let bytes = render_pdf(&layout)
            .with_context(|| format!("Failed to render PDF of transaction #{number}"))?;

        info!(
            "Rendered transaction #{} as {} page(s), {} bytes",
            number,
            page_count,
            bytes.len()
        );

        Ok(ExportedDocument {
            file_name: export_file_name(number),
            page_count,
            bytes,
        })
    }

    /// Load a transaction with its items and render it.
    /// Returns `None` when the transaction does not exist.
    pub async fn export_transaction<C: Connection>(
        &self,
        transaction_id: &str,
        transaction_service: &TransactionService<C>,
    ) -> Result<Option<ExportedDocument>> {
        info!("Exporting transaction {} as PDF", transaction_id);

        let Some(transaction) = transaction_service
            .get_transaction_with_items(transaction_id)
            .await?
        else {
            return Ok(None);
        };

        self.render_transaction(&transaction, Local::now().naive_local())
            .map(Some)
    }

    /// Render and write `movimentacao-<number>.pdf` into the export directory.
    /// Returns the written path, or `None` when the transaction does not exist.
    pub async fn export_to_path<C: Connection>(
        &self,
        transaction_id: &str,
        transaction_service: &TransactionService<C>,
    ) -> Result<Option<PathBuf>> {
        let Some(document) = self
            .export_transaction(transaction_id, transaction_service)
            .await?
        else {
            return Ok(None);
        };

        fs::create_dir_all(&self.export_dir).with_context(|| {
            format!(
                "Failed to create export directory {}",
                self.export_dir.display()
            )
        })?;

        let file_path = self.export_dir.join(&document.file_name);
        if let Err(e) = fs::write(&file_path, &document.bytes) {
            error!("Failed to write export file {}: {}", file_path.display(), e);
            return Err(e).with_context(|| format!("Failed to write {}", file_path.display()));
        }

        info!("Exported transaction {} to {}", transaction_id, file_path.display());

        Ok(Some(file_path))
    }
}
