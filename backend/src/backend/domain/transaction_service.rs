//! Financial ledger: transaction headers and their line items.
//!
//! A transaction and its items live in two collections and the store offers no
//! multi-collection transaction, so creates, updates and deletes are a sequence of
//! calls. When a later call fails, the earlier ones are undone with
//! compensating writes before the error is returned.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use shared::{
    CreateTransactionRequest, FinancialTransaction, ItemLine, TransactionItem,
    TransactionItemRecord, TransactionListResponse, TransactionRecord, TransactionStatistics,
    TransactionWithItems, UpdateTransactionRequest,
};

use crate::backend::domain::numbering::NumberingService;
use crate::backend::domain::search::filter_transactions;
use crate::backend::domain::validation::{validate_items, validate_transaction_header};
use crate::backend::storage::{
    Connection, TransactionItemStorage, TransactionStorage, TransactionUpdate,
};

fn item_records<'a>(
    transaction_id: &str,
    lines: impl IntoIterator<Item = &'a ItemLine>,
) -> Vec<TransactionItemRecord> {
    lines
        .into_iter()
        .map(|line| TransactionItemRecord {
            transaction_id: transaction_id.to_string(),
            line: line.clone(),
        })
        .collect()
}

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    item_repository: C::TransactionItemRepository,
    numbering: NumberingService<C>,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
            item_repository: connection.create_transaction_item_repository(),
            numbering: NumberingService::new(connection),
        }
    }

    /// All transactions, most recently created first
    pub async fn list_transactions(&self) -> Result<TransactionListResponse> {
        info!("Listing all transactions");

        let transactions = self.transaction_repository.list_transactions().await?;

        info!("Found {} transactions", transactions.len());

        Ok(TransactionListResponse { transactions })
    }

    pub async fn search_transactions(&self, term: &str) -> Result<TransactionListResponse> {
        info!("Searching transactions for {:?}", term);

        let transactions =
            filter_transactions(self.transaction_repository.list_transactions().await?, term);

        info!("{} transactions match {:?}", transactions.len(), term);

        Ok(TransactionListResponse { transactions })
    }

    /// The transaction with its items in creation order, or `None` when it does not exist
    pub async fn get_transaction_with_items(
        &self,
        transaction_id: &str,
    ) -> Result<Option<TransactionWithItems>> {
        info!("Getting transaction with items: {}", transaction_id);

        let Some(transaction) = self
            .transaction_repository
            .get_transaction(transaction_id)
            .await?
        else {
            warn!("Transaction not found: {}", transaction_id);
            return Ok(None);
        };

        let items = self.item_repository.list_items(transaction_id).await?;

        Ok(Some(TransactionWithItems { transaction, items }))
    }

    /// Number the transaction, store its header, then its items.
    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<TransactionWithItems> {
        info!(
            "Creating transaction: company={}, invoice={}, items={}",
            request.header.company_name,
            request.header.invoice_number,
            request.items.len()
        );

        validate_transaction_header(&request.header)?;
        validate_items(&request.items)?;

        let transaction_number = self.numbering.next_transaction_number().await?;
        let record = TransactionRecord {
            transaction_number,
            total_value: ItemLine::total(&request.items),
            header: request.header,
        };

        let transaction = self.transaction_repository.store_transaction(&record).await?;

        let items = match self.store_lines(&transaction.id, &request.items).await {
            Ok(items) => items,
            Err(e) => {
                error!(
                    "Items of transaction {} failed to save, removing its header",
                    transaction.id
                );
                if let Err(undo) = self
                    .transaction_repository
                    .delete_transaction(&transaction.id)
                    .await
                {
                    error!(
                        "Could not remove header of transaction {}: {:#}",
                        transaction.id, undo
                    );
                }
                return Err(e);
            }
        };

        info!(
            "Created transaction #{} with ID {} and total {:.2}",
            transaction.record.transaction_number, transaction.id, transaction.record.total_value
        );

        Ok(TransactionWithItems { transaction, items })
    }

    /// Update the header and, when `items` is given, replace the whole item set.
    ///
    /// Returns `None` when the transaction does not exist. The total is only
    /// recomputed when the items are replaced.
    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        request: UpdateTransactionRequest,
    ) -> Result<Option<TransactionWithItems>> {
        info!("Updating transaction: {}", transaction_id);

        validate_transaction_header(&request.header)?;
        if let Some(lines) = &request.items {
            validate_items(lines)?;
        }

        let Some(previous) = self
            .transaction_repository
            .get_transaction(transaction_id)
            .await?
        else {
            warn!("Transaction not found for update: {}", transaction_id);
            return Ok(None);
        };

        let previous_items = match &request.items {
            Some(_) => Some(self.item_repository.list_items(transaction_id).await?),
            None => None,
        };

        let update = TransactionUpdate {
            header: request.header,
            total_value: request.items.as_ref().map(|lines| ItemLine::total(lines)),
        };
        let Some(transaction) = self
            .transaction_repository
            .update_transaction(transaction_id, &update)
            .await?
        else {
            warn!("Transaction disappeared during update: {}", transaction_id);
            return Ok(None);
        };

        let items = match (request.items, previous_items) {
            (Some(lines), Some(previous_items)) => {
                match self.replace_lines(transaction_id, &lines).await {
                    Ok(items) => items,
                    Err(e) => {
                        self.restore(&previous, &previous_items).await;
                        return Err(e);
                    }
                }
            }
            _ => self.item_repository.list_items(transaction_id).await?,
        };

        info!(
            "Updated transaction #{} with ID {}",
            transaction.record.transaction_number, transaction.id
        );

        Ok(Some(TransactionWithItems { transaction, items }))
    }

    /// Delete the items, then the transaction. Returns false when the transaction does not exist.
    ///
    /// If the header delete fails, the items are put back before the error is returned.
    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        info!("Deleting transaction: {}", transaction_id);

        let previous_items = self.item_repository.list_items(transaction_id).await?;
        let removed_items = self.item_repository.delete_items(transaction_id).await?;

        let deleted = match self
            .transaction_repository
            .delete_transaction(transaction_id)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => {
                self.restore_items(transaction_id, &previous_items).await;
                return Err(e);
            }
        };

        if deleted {
            info!(
                "Deleted transaction {} and {} items",
                transaction_id, removed_items
            );
        } else {
            warn!("Transaction not found for delete: {}", transaction_id);
        }

        Ok(deleted)
    }

    /// Count and sum over every stored total. Reads the whole table.
    pub async fn get_statistics(&self) -> Result<TransactionStatistics> {
        info!("Computing transaction statistics");

        let totals = self.transaction_repository.list_total_values().await?;

        Ok(TransactionStatistics {
            total_transactions: totals.len(),
            total_value: totals.iter().sum(),
        })
    }

    async fn store_lines(
        &self,
        transaction_id: &str,
        lines: &[ItemLine],
    ) -> Result<Vec<TransactionItem>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        self.item_repository
            .store_items(&item_records(transaction_id, lines))
            .await
            .with_context(|| format!("Failed to save items of transaction {transaction_id}"))
    }

    async fn replace_lines(
        &self,
        transaction_id: &str,
        lines: &[ItemLine],
    ) -> Result<Vec<TransactionItem>> {
        let removed = self
            .item_repository
            .delete_items(transaction_id)
            .await
            .with_context(|| format!("Failed to clear items of transaction {transaction_id}"))?;
        info!("Replacing {} items of transaction {}", removed, transaction_id);

        self.store_lines(transaction_id, lines).await
    }

    /// Put back the header and items as they were before a failed update.
    /// Failures here are logged only.
    async fn restore(&self, previous: &FinancialTransaction, previous_items: &[TransactionItem]) {
        let id = &previous.id;
        error!("Item replacement of transaction {} failed, restoring previous state", id);

        let header = TransactionUpdate {
            header: previous.record.header.clone(),
            total_value: Some(previous.record.total_value),
        };
        if let Err(e) = self
            .transaction_repository
            .update_transaction(id, &header)
            .await
        {
            error!("Could not restore header of transaction {}: {:#}", id, e);
        }

        if let Err(e) = self.item_repository.delete_items(id).await {
            error!("Could not clear items of transaction {}: {:#}", id, e);
            return;
        }
        self.restore_items(id, previous_items).await;
    }

    /// Re-insert items removed by a write that later failed. Failures here are logged only.
    async fn restore_items(&self, transaction_id: &str, previous_items: &[TransactionItem]) {
        if previous_items.is_empty() {
            return;
        }
        let records = item_records(transaction_id, previous_items.iter().map(|item| &item.line));
        if let Err(e) = self.item_repository.store_items(&records).await {
            error!("Could not restore items of transaction {}: {:#}", transaction_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::validation::ValidationError;
    use crate::backend::storage::{MemoryConnection, SequenceStorage, Table};
    use chrono::NaiveDate;
    use shared::TransactionHeader;

    fn setup() -> (MemoryConnection, TransactionService<MemoryConnection>) {
        let connection = MemoryConnection::new();
        let service = TransactionService::new(Arc::new(connection.clone()));
        (connection, service)
    }

    fn header(company: &str, invoice: &str) -> TransactionHeader {
        TransactionHeader {
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            entry_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            company_name: company.to_string(),
            invoice_number: invoice.to_string(),
        }
    }

    fn create_request() -> CreateTransactionRequest {
        CreateTransactionRequest {
            header: header("Papelaria Central", "NF-1001"),
            items: vec![
                ItemLine::new("Caderno", 10.0, 7.5),
                ItemLine::new("Lápis", 20.0, 1.25),
            ],
        }
    }

    #[tokio::test]
    async fn create_numbers_and_totals_the_transaction() {
        let (_, service) = setup();

        let created = service.create_transaction(create_request()).await.unwrap();
        assert_eq!(created.transaction.record.transaction_number, "000001");
        assert_eq!(created.transaction.record.total_value, 100.0);
        assert_eq!(created.items.len(), 2);

        let fetched = service
            .get_transaction_with_items(&created.transaction.id)
            .await
            .unwrap()
            .unwrap();
        let names: Vec<&str> = fetched
            .items
            .iter()
            .map(|i| i.line.item_name.as_str())
            .collect();
        assert_eq!(names, vec!["Caderno", "Lápis"]);

        let second = service.create_transaction(create_request()).await.unwrap();
        assert_eq!(second.transaction.record.transaction_number, "000002");
    }

    #[tokio::test]
    async fn create_without_number_writes_nothing() {
        let (connection, service) = setup();
        connection.set_sequence_offline(true).unwrap();

        assert!(service.create_transaction(create_request()).await.is_err());
        assert!(service.list_transactions().await.unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn failed_items_remove_the_new_header() {
        let (connection, service) = setup();
        connection.set_offline(Table::TransactionItems, true).unwrap();

        assert!(service.create_transaction(create_request()).await.is_err());
        assert!(service.list_transactions().await.unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn create_validates_before_numbering() {
        let (connection, service) = setup();
        let mut request = create_request();
        request.items.push(ItemLine::new(" ", 1.0, 1.0));

        let err = service.create_transaction(request).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::MissingItemName { position: 3 })
        );

        // The sequence was not consumed
        let number = connection
            .create_sequence_repository()
            .next_transaction_number()
            .await
            .unwrap();
        assert_eq!(number, "000001");
    }

    #[tokio::test]
    async fn update_with_items_replaces_them_and_the_total() {
        let (_, service) = setup();
        let created = service.create_transaction(create_request()).await.unwrap();
        let id = created.transaction.id.clone();

        let updated = service
            .update_transaction(
                &id,
                UpdateTransactionRequest {
                    header: header("Papelaria Nova", "NF-1001"),
                    items: Some(vec![ItemLine::new("Mochila", 2.0, 80.0)]),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.transaction.record.header.company_name, "Papelaria Nova");
        assert_eq!(updated.transaction.record.total_value, 160.0);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(
            updated.transaction.record.transaction_number,
            created.transaction.record.transaction_number
        );
    }

    #[tokio::test]
    async fn update_without_items_keeps_items_and_total() {
        let (_, service) = setup();
        let created = service.create_transaction(create_request()).await.unwrap();

        let updated = service
            .update_transaction(
                &created.transaction.id,
                UpdateTransactionRequest {
                    header: header("Outra", "NF-2"),
                    items: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.transaction.record.total_value, 100.0);
        assert_eq!(updated.items.len(), 2);
    }

    #[tokio::test]
    async fn failed_item_replacement_restores_previous_state() {
        let (connection, service) = setup();
        let created = service.create_transaction(create_request()).await.unwrap();
        let id = created.transaction.id.clone();

        connection.set_offline(Table::TransactionItems, true).unwrap();
        let result = service
            .update_transaction(
                &id,
                UpdateTransactionRequest {
                    header: header("Empresa Errada", "NF-9"),
                    items: Some(vec![ItemLine::new("Mochila", 2.0, 80.0)]),
                },
            )
            .await;
        assert!(result.is_err());
        connection.set_offline(Table::TransactionItems, false).unwrap();

        let restored = service
            .get_transaction_with_items(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.transaction.record.header.company_name, "Papelaria Central");
        assert_eq!(restored.transaction.record.total_value, 100.0);
        assert_eq!(restored.items.len(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_transaction_is_none() {
        let (_, service) = setup();
        let result = service
            .update_transaction(
                "missing",
                UpdateTransactionRequest {
                    header: header("A", "B"),
                    items: None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_removes_from_listing_and_items() {
        let (connection, service) = setup();
        let created = service.create_transaction(create_request()).await.unwrap();
        let id = created.transaction.id.clone();

        assert!(service.delete_transaction(&id).await.unwrap());
        assert!(service.list_transactions().await.unwrap().transactions.is_empty());
        assert!(connection
            .create_transaction_item_repository()
            .list_items(&id)
            .await
            .unwrap()
            .is_empty());
        assert!(service.get_transaction_with_items(&id).await.unwrap().is_none());
        assert!(!service.delete_transaction(&id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_header_delete_puts_the_items_back() {
        let (connection, service) = setup();
        let created = service.create_transaction(create_request()).await.unwrap();
        let id = created.transaction.id.clone();

        connection
            .set_offline(Table::FinancialTransactions, true)
            .unwrap();
        assert!(service.delete_transaction(&id).await.is_err());
        connection
            .set_offline(Table::FinancialTransactions, false)
            .unwrap();

        let kept = service
            .get_transaction_with_items(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.transaction.record.total_value, 100.0);
        let names: Vec<&str> = kept.items.iter().map(|i| i.line.item_name.as_str()).collect();
        assert_eq!(names, vec!["Caderno", "Lápis"]);
    }

    #[tokio::test]
    async fn statistics_count_and_sum() {
        let (_, service) = setup();
        service.create_transaction(create_request()).await.unwrap();
        service
            .create_transaction(CreateTransactionRequest {
                header: header("Mercado", "NF-7"),
                items: vec![ItemLine::new("Arroz", 2.0, 25.5)],
            })
            .await
            .unwrap();

        let stats = service.get_statistics().await.unwrap();
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_value, 151.0);

        let found = service.search_transactions("mercado").await.unwrap();
        assert_eq!(found.transactions.len(), 1);
    }
}
