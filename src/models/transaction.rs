//! Transaction model
//!
//! Amounts are always positive; direction (income vs expense) comes from the
//! owning category. Deleting is usually soft (`is_active = false`) so history
//! survives and a restore is possible.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, TransactionId};
use super::money::Money;
use super::period::BudgetMonth;

/// A single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// The budget this transaction belongs to
    pub budget_id: Option<BudgetId>,

    /// The category this transaction books against
    pub category_id: Option<CategoryId>,

    /// Amount, always positive; direction comes from the category
    pub amount: Money,

    /// Free-form description
    pub description: String,

    /// Real-world transaction date
    pub date: NaiveDate,

    /// The monthly cycle this transaction counts toward for reporting
    ///
    /// Usually the month of `date`, but imports may attribute a row to an
    /// explicit period decoded from the source filename.
    pub budget_period: BudgetMonth,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new active transaction attributed to the month of `date`
    pub fn new(amount: Money, description: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            budget_id: None,
            category_id: None,
            amount,
            description: description.into(),
            date,
            budget_period: BudgetMonth::containing(date),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a transaction with its budget, category, and explicit period
    pub fn with_details(
        amount: Money,
        description: impl Into<String>,
        date: NaiveDate,
        budget_id: BudgetId,
        category_id: CategoryId,
        budget_period: Option<BudgetMonth>,
    ) -> Self {
        let mut txn = Self::new(amount, description, date);
        txn.budget_id = Some(budget_id);
        txn.category_id = Some(category_id);
        if let Some(period) = budget_period {
            txn.budget_period = period;
        }
        txn
    }

    /// Mark the transaction inactive, keeping it for history and restore
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Bring a soft-deleted transaction back
    pub fn restore(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_transaction_defaults_period_to_own_month() {
        let txn = Transaction::new(Money::from_major(224), "sunscreen", date(2025, 12, 17));
        assert_eq!(txn.budget_period, BudgetMonth::containing(date(2025, 12, 1)));
        assert!(txn.is_active);
    }

    #[test]
    fn test_with_details_explicit_period() {
        let budget_id = BudgetId::new();
        let category_id = CategoryId::new();
        let period = BudgetMonth::from_ym(2025, 11).unwrap();

        let txn = Transaction::with_details(
            Money::from_major(3000),
            "savings",
            date(2025, 12, 30),
            budget_id,
            category_id,
            Some(period),
        );

        assert_eq!(txn.budget_id, Some(budget_id));
        assert_eq!(txn.category_id, Some(category_id));
        // Attributed month differs from the literal date's month
        assert_eq!(txn.budget_period, period);
    }

    #[test]
    fn test_soft_delete_and_restore() {
        let mut txn = Transaction::new(Money::from_major(10), "coffee", date(2025, 1, 5));

        txn.soft_delete();
        assert!(!txn.is_active);

        txn.restore();
        assert!(txn.is_active);
    }

    #[test]
    fn test_display() {
        let txn = Transaction::new(Money::from_cents(5000), "groceries", date(2025, 1, 15));
        assert_eq!(format!("{}", txn), "2025-01-15 groceries 50.00");
    }

    #[test]
    fn test_serialization() {
        let txn = Transaction::new(Money::from_major(100), "salary", date(2025, 12, 29));
        let json = serde_json::to_string(&txn).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn.id, deserialized.id);
        assert_eq!(txn.budget_period, deserialized.budget_period);
    }
}
