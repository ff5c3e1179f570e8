//! Category model
//!
//! Categories are income or expense buckets with an allocation ceiling and a
//! running usage cache. Expense categories can be fixed-term installments
//! with a computed end date and a one-payment-per-month guard.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId};
use super::money::Money;
use super::period::{add_months, is_same_month};
use super::transaction::Transaction;

/// An income or expense bucket within a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// The budget this category belongs to (non-owning back-reference)
    pub budget_id: Option<BudgetId>,

    /// Category name (matched case-insensitively within a budget)
    pub name: String,

    /// Planned allocation ceiling
    pub allocated_amount: Money,

    /// Derived cache: sum of active transaction amounts in this category
    pub used_amount: Money,

    /// Income categories are funding sources, not spending caps
    pub is_income: bool,

    /// Archive flag; archived categories keep their history but are hidden
    pub is_active: bool,

    /// Whether this is a fixed-term installment category
    pub is_installment: bool,

    /// Installment: payment expected each month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,

    /// Installment: total amount over the whole term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_installment_amount: Option<Money>,

    /// Installment: term length in months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_months: Option<u32>,

    /// Installment: first payment month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_start_date: Option<NaiveDate>,

    /// Installment: start date plus the term, calendar-month arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_end_date: Option<NaiveDate>,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category with zero usage
    pub fn new(
        name: impl Into<String>,
        allocated_amount: Money,
        is_income: bool,
        budget_id: Option<BudgetId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            budget_id,
            name: name.into(),
            allocated_amount,
            used_amount: Money::zero(),
            is_income,
            is_active: true,
            is_installment: false,
            monthly_payment: None,
            total_installment_amount: None,
            installment_months: None,
            installment_start_date: None,
            installment_end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Computed properties

    /// Allocation left after usage
    pub fn remaining_amount(&self) -> Money {
        self.allocated_amount - self.used_amount
    }

    /// Fraction of the allocation used, for display only
    pub fn usage_ratio(&self) -> f64 {
        self.used_amount.ratio_of(self.allocated_amount)
    }

    pub fn is_over_budget(&self) -> bool {
        self.used_amount > self.allocated_amount
    }

    // Business logic

    /// Whether a transaction dated `date` may book against this category
    ///
    /// Archived categories are never valid; installment categories expire
    /// after their end date. The one-payment-per-month installment guard
    /// needs the category's transactions and lives in the service layer.
    pub fn is_valid_for(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }

        if self.is_installment {
            if let Some(end_date) = self.installment_end_date {
                return date <= end_date;
            }
        }

        true
    }

    /// Check for an active transaction already booked in the month of `date`
    ///
    /// Only meaningful for installment categories; `transactions` must be
    /// this category's own transactions. `excluding` skips the transaction
    /// being edited.
    pub fn has_transaction_in_month(
        &self,
        transactions: &[Transaction],
        date: NaiveDate,
        excluding: Option<&Transaction>,
    ) -> bool {
        if !self.is_installment {
            return false;
        }

        transactions.iter().any(|txn| {
            if let Some(excluded) = excluding {
                if txn.id == excluded.id {
                    return false;
                }
            }
            txn.is_active && is_same_month(txn.date, date)
        })
    }

    /// Recompute the usage cache from this category's transactions
    ///
    /// Always a full rescan over active transactions rather than incremental
    /// arithmetic, so call sites cannot drift the running total.
    pub fn update_used_amount(&mut self, transactions: &[Transaction]) {
        self.used_amount = transactions
            .iter()
            .filter(|txn| txn.is_active)
            .map(|txn| txn.amount)
            .sum();
        self.touch();
    }

    /// Archive the category, keeping its transaction history
    pub fn archive(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // Installment helpers

    /// Turn this category into a fixed-term installment
    ///
    /// The end date is `start_date` plus `months`, calendar-month arithmetic.
    pub fn configure_installment(
        &mut self,
        monthly_payment: Money,
        total_amount: Money,
        months: u32,
        start_date: NaiveDate,
    ) {
        self.is_installment = true;
        self.monthly_payment = Some(monthly_payment);
        self.total_installment_amount = Some(total_amount);
        self.installment_months = Some(months);
        self.installment_start_date = Some(start_date);
        self.installment_end_date = Some(add_months(start_date, months));
        self.touch();
    }

    /// Fraction of the installment total paid off, for display only
    pub fn installment_progress(&self) -> f64 {
        match self.total_installment_amount {
            Some(total) if self.is_installment => self.used_amount.ratio_of(total),
            _ => 0.0,
        }
    }

    /// Whole months left until the installment ends, from `today`
    pub fn remaining_installment_months(&self, today: NaiveDate) -> Option<u32> {
        if !self.is_installment {
            return None;
        }
        let end = self.installment_end_date?;

        let mut months = 0u32;
        let mut current = today;
        while current < end {
            current = add_months(current, 1);
            months += 1;
        }
        Some(months)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Form-level draft for creating or editing a category
///
/// Holds category input before it is persisted; validation mirrors what the
/// budget form enforces.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub allocated_amount: Money,
    pub is_income: bool,
    pub installment: Option<InstallmentPlan>,
}

/// Installment parameters supplied with a draft
#[derive(Debug, Clone, Copy)]
pub struct InstallmentPlan {
    pub monthly_payment: Money,
    pub total_amount: Money,
    pub months: u32,
    pub start_date: NaiveDate,
}

impl CategoryDraft {
    /// Create a draft for a plain category
    pub fn new(name: impl Into<String>, allocated_amount: Money, is_income: bool) -> Self {
        Self {
            name: name.into(),
            allocated_amount,
            is_income,
            installment: None,
        }
    }

    /// Validate the draft in isolation
    ///
    /// Duplicate-name checks need the budget's existing categories and are
    /// done by the category service.
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if !self.allocated_amount.is_positive() {
            return Err(CategoryValidationError::NonPositiveAmount);
        }

        if let Some(plan) = &self.installment {
            if self.is_income {
                return Err(CategoryValidationError::InvalidInstallment(
                    "income categories cannot be installments",
                ));
            }
            if plan.months == 0 {
                return Err(CategoryValidationError::InvalidInstallment(
                    "term must be at least one month",
                ));
            }
            if !plan.monthly_payment.is_positive() || !plan.total_amount.is_positive() {
                return Err(CategoryValidationError::InvalidInstallment(
                    "installment amounts must be positive",
                ));
            }
        }

        Ok(())
    }
}

/// Validation errors for category drafts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NonPositiveAmount,
    DuplicateName(String),
    InvalidInstallment(&'static str),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NonPositiveAmount => write!(f, "Allocated amount must be positive"),
            Self::DuplicateName(name) => {
                write!(f, "Category '{}' already exists in this budget", name)
            }
            Self::InvalidInstallment(reason) => {
                write!(f, "Invalid installment parameters: {}", reason)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_category() {
        let budget_id = BudgetId::new();
        let category = Category::new("Groceries", Money::from_major(1000), false, Some(budget_id));

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.used_amount, Money::zero());
        assert!(category.is_active);
        assert!(!category.is_installment);
        assert_eq!(category.budget_id, Some(budget_id));
    }

    #[test]
    fn test_remaining_and_overflow() {
        let mut category = Category::new("Food", Money::from_major(100), false, None);
        category.used_amount = Money::from_major(40);

        assert_eq!(category.remaining_amount(), Money::from_major(60));
        assert!(!category.is_over_budget());

        category.used_amount = Money::from_major(140);
        assert!(category.is_over_budget());
    }

    #[test]
    fn test_update_used_amount_counts_only_active() {
        let mut category = Category::new("Food", Money::from_major(100), false, None);
        let mut t1 = Transaction::new(Money::from_major(30), "a", date(2025, 1, 5));
        let t2 = Transaction::new(Money::from_major(20), "b", date(2025, 1, 9));
        t1.soft_delete();

        category.update_used_amount(&[t1, t2]);
        assert_eq!(category.used_amount, Money::from_major(20));
    }

    #[test]
    fn test_installment_configuration() {
        let mut category = Category::new("Phone Plan", Money::from_major(500), false, None);
        category.configure_installment(
            Money::from_major(500),
            Money::from_major(1500),
            3,
            date(2025, 1, 1),
        );

        assert!(category.is_installment);
        assert_eq!(category.installment_end_date, Some(date(2025, 4, 1)));
    }

    #[test]
    fn test_installment_validity_window() {
        let mut category = Category::new("Loan", Money::from_major(100), false, None);
        category.configure_installment(
            Money::from_major(100),
            Money::from_major(300),
            3,
            date(2025, 1, 1),
        );

        assert!(category.is_valid_for(date(2025, 3, 15)));
        assert!(category.is_valid_for(date(2025, 4, 1)));
        assert!(!category.is_valid_for(date(2025, 4, 15)));
    }

    #[test]
    fn test_archived_category_never_valid() {
        let mut category = Category::new("Old", Money::from_major(100), false, None);
        category.archive();
        assert!(!category.is_valid_for(date(2025, 1, 1)));
    }

    #[test]
    fn test_has_transaction_in_month() {
        let mut category = Category::new("Loan", Money::from_major(100), false, None);
        category.configure_installment(
            Money::from_major(100),
            Money::from_major(600),
            6,
            date(2025, 1, 1),
        );

        let paid = Transaction::new(Money::from_major(100), "jan payment", date(2025, 1, 10));
        let txns = vec![paid.clone()];

        assert!(category.has_transaction_in_month(&txns, date(2025, 1, 25), None));
        assert!(!category.has_transaction_in_month(&txns, date(2025, 2, 25), None));
        // The transaction being edited does not count against itself
        assert!(!category.has_transaction_in_month(&txns, date(2025, 1, 25), Some(&paid)));
    }

    #[test]
    fn test_has_transaction_in_month_ignores_inactive() {
        let mut category = Category::new("Loan", Money::from_major(100), false, None);
        category.configure_installment(
            Money::from_major(100),
            Money::from_major(600),
            6,
            date(2025, 1, 1),
        );

        let mut deleted = Transaction::new(Money::from_major(100), "undone", date(2025, 1, 10));
        deleted.soft_delete();

        assert!(!category.has_transaction_in_month(&[deleted], date(2025, 1, 25), None));
    }

    #[test]
    fn test_remaining_installment_months() {
        let mut category = Category::new("Loan", Money::from_major(100), false, None);
        category.configure_installment(
            Money::from_major(100),
            Money::from_major(600),
            6,
            date(2025, 1, 1),
        );

        assert_eq!(
            category.remaining_installment_months(date(2025, 4, 1)),
            Some(3)
        );
        assert_eq!(
            category.remaining_installment_months(date(2025, 8, 1)),
            Some(0)
        );
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = CategoryDraft::new("Groceries", Money::from_major(1000), false);
        assert!(draft.validate().is_ok());

        draft.name = "  ".into();
        assert_eq!(draft.validate(), Err(CategoryValidationError::EmptyName));

        draft.name = "Groceries".into();
        draft.allocated_amount = Money::zero();
        assert_eq!(
            draft.validate(),
            Err(CategoryValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_draft_installment_validation() {
        let mut draft = CategoryDraft::new("Loan", Money::from_major(600), false);
        draft.installment = Some(InstallmentPlan {
            monthly_payment: Money::from_major(100),
            total_amount: Money::from_major(600),
            months: 6,
            start_date: date(2025, 1, 1),
        });
        assert!(draft.validate().is_ok());

        draft.installment.as_mut().unwrap().months = 0;
        assert!(matches!(
            draft.validate(),
            Err(CategoryValidationError::InvalidInstallment(_))
        ));

        draft.installment.as_mut().unwrap().months = 6;
        draft.is_income = true;
        assert!(matches!(
            draft.validate(),
            Err(CategoryValidationError::InvalidInstallment(_))
        ));
    }

    #[test]
    fn test_serialization_skips_absent_installment_fields() {
        let category = Category::new("Plain", Money::from_major(10), false, None);
        let json = serde_json::to_string(&category).unwrap();
        assert!(!json.contains("monthly_payment"));

        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(category.id, deserialized.id);
        assert!(deserialized.installment_end_date.is_none());
    }
}
