//! Mock transaction data and list shaping for the history and detail screens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::PinKitError;

mod fixtures;

pub use fixtures::fixture_transactions;

/// Simulated network delay of the mock source.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_secs(1);

/// Direction of a transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionKind {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

/// A single account movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct Transaction {
    /// Unique identifier.
    pub id: String,
    /// Amount in whole currency units.
    pub amount: u64,
    /// RFC 3339 timestamp.
    pub date: String,
    /// Free-text description.
    pub description: String,
    /// Credit or debit.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// Parses the timestamp. Returns `None` if it is not valid RFC 3339.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Transactions that happened on the same calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DayGroup {
    /// ISO date (`2025-02-15`), empty when the timestamps could not be parsed.
    pub day: String,
    /// Header text (`Sat Feb 15 2025`).
    pub label: String,
    /// Transactions of that day, in input order.
    pub transactions: Vec<Transaction>,
}

const UNKNOWN_DAY_LABEL: &str = "Unknown date";

/// Where an amount is rendered. The history list and the detail screen use
/// different formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, uniffi::Enum)]
#[strum(serialize_all = "lowercase")]
pub enum AmountStyle {
    /// History row: `+ RM 10000.00`, or a bare `****` when masked.
    List,
    /// Detail screen: `+$10000`, or `+$****` when masked. The sign stays visible.
    Detail,
}

/// Formats the amount of `transaction` for `style`, masking the digits unless
/// `revealed`.
#[must_use]
pub fn format_amount(transaction: &Transaction, style: AmountStyle, revealed: bool) -> String {
    let sign = match transaction.kind {
        TransactionKind::Credit => '+',
        TransactionKind::Debit => '-',
    };
    match (style, revealed) {
        (AmountStyle::List, true) => format!("{sign} RM {}.00", transaction.amount),
        (AmountStyle::List, false) => MASK.to_string(),
        (AmountStyle::Detail, true) => format!("{sign}${}", transaction.amount),
        (AmountStyle::Detail, false) => format!("{sign}${MASK}"),
    }
}

const MASK: &str = "****";

/// Sorts newest first. Transactions with unparseable timestamps go last.
///
/// [`Ledger::load`] does not sort; hosts that want a strict timeline call this
/// before [`group_by_day`].
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|tx| std::cmp::Reverse(tx.timestamp()));
}

/// Groups transactions by calendar day, keeping days in order of first
/// appearance.
#[must_use]
pub fn group_by_day(transactions: &[Transaction]) -> Vec<DayGroup> {
    let mut groups: Vec<(Option<NaiveDate>, DayGroup)> = Vec::new();
    for tx in transactions {
        let day = tx.timestamp().map(|ts| ts.date_naive());
        if let Some((_, group)) = groups.iter_mut().find(|(d, _)| *d == day) {
            group.transactions.push(tx.clone());
            continue;
        }
        let (iso, label) = day.map_or_else(
            || (String::new(), UNKNOWN_DAY_LABEL.to_string()),
            |d| (d.to_string(), d.format("%a %b %d %Y").to_string()),
        );
        groups.push((
            day,
            DayGroup {
                day: iso,
                label,
                transactions: vec![tx.clone()],
            },
        ));
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Looks up a transaction by id.
#[must_use]
pub fn find<'a>(transactions: &'a [Transaction], id: &str) -> Option<&'a Transaction> {
    transactions.iter().find(|tx| tx.id == id)
}

/// Source of the transaction list.
#[async_trait::async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetches all transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot produce the list.
    async fn fetch(&self) -> Result<Vec<Transaction>, PinKitError>;
}

/// Returns the fixture list after a simulated delay.
#[derive(Debug, Clone)]
pub struct MockTransactionSource {
    delay: Duration,
}

impl MockTransactionSource {
    /// Creates a source answering after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockTransactionSource {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_DELAY)
    }
}

#[async_trait::async_trait]
impl TransactionSource for MockTransactionSource {
    async fn fetch(&self) -> Result<Vec<Transaction>, PinKitError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(fixture_transactions())
    }
}

/// Transaction list as shown by the history and detail screens.
#[derive(uniffi::Object)]
pub struct Ledger {
    source: Arc<dyn TransactionSource>,
}

#[uniffi::export(async_runtime = "tokio")]
impl Ledger {
    /// Creates a ledger over the mock fixtures, answering after `delay_ms`.
    #[uniffi::constructor]
    #[must_use]
    pub fn mock(delay_ms: u64) -> Self {
        Self::new(Arc::new(MockTransactionSource::new(Duration::from_millis(
            delay_ms,
        ))))
    }

    /// Loads the list grouped by day, in the order the source returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails.
    pub async fn load(&self) -> Result<Vec<DayGroup>, PinKitError> {
        let transactions = self.source.fetch().await?;
        log::debug!("loaded {} transactions", transactions.len());
        Ok(group_by_day(&transactions))
    }

    /// Loads a single transaction for the detail screen.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::TransactionNotFound`] if no transaction has `id`.
    pub async fn transaction(&self, id: String) -> Result<Transaction, PinKitError> {
        let transactions = self.source.fetch().await?;
        find(&transactions, &id)
            .cloned()
            .ok_or(PinKitError::TransactionNotFound(id))
    }
}

impl Ledger {
    /// Creates a ledger over any source.
    #[must_use]
    pub fn new(source: Arc<dyn TransactionSource>) -> Self {
        Self { source }
    }
}
