use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One line of an invoice.
///
/// `final_value` is private and only ever derived from `quantity × unit_value`, so a line can
/// never carry a stale total. Incoming JSON may include a `final_value`; it is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItemLine")]
pub struct ItemLine {
    pub item_name: String,
    quantity: f64,
    unit_value: f64,
    final_value: f64,
}

#[derive(Deserialize)]
struct RawItemLine {
    item_name: String,
    quantity: f64,
    unit_value: f64,
}

impl From<RawItemLine> for ItemLine {
    fn from(raw: RawItemLine) -> Self {
        Self::new(raw.item_name, raw.quantity, raw.unit_value)
    }
}

impl ItemLine {
    pub fn new(item_name: impl Into<String>, quantity: f64, unit_value: f64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
            unit_value,
            final_value: quantity * unit_value,
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_value(&self) -> f64 {
        self.unit_value
    }

    pub fn final_value(&self) -> f64 {
        self.final_value
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.final_value = self.quantity * self.unit_value;
    }

    pub fn set_unit_value(&mut self, unit_value: f64) {
        self.unit_value = unit_value;
        self.final_value = self.quantity * self.unit_value;
    }

    /// Sum of the final values, i.e. the transaction total.
    pub fn total<'a>(lines: impl IntoIterator<Item = &'a ItemLine>) -> f64 {
        lines.into_iter().map(ItemLine::final_value).sum()
    }
}

/// Fields typed in by staff on the transaction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionHeader {
    pub issue_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub company_name: String,
    pub invoice_number: String,
}

/// Row written to the `financial_transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Store-generated sequential number, distinct from the row id
    pub transaction_number: String,
    #[serde(flatten)]
    pub header: TransactionHeader,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: String,
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row written to the `transaction_items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItemRecord {
    pub transaction_id: String,
    #[serde(flatten)]
    pub line: ItemLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    #[serde(flatten)]
    pub line: ItemLine,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionWithItems {
    #[serde(flatten)]
    pub transaction: FinancialTransaction,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(flatten)]
    pub header: TransactionHeader,
    pub items: Vec<ItemLine>,
}

/// Without `items` only the header changes; with `items` the whole item set is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(flatten)]
    pub header: TransactionHeader,
    #[serde(default)]
    pub items: Option<Vec<ItemLine>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<FinancialTransaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatistics {
    pub total_transactions: usize,
    pub total_value: f64,
}
