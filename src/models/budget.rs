//! Budget and BudgetAllocation models
//!
//! A budget is a named spending plan owning categories and transactions.
//! Its `remaining_amount` is a derived cache over active transactions,
//! recomputed by the service layer after every mutation that touches them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AllocationId, BudgetId};
use super::money::Money;

/// A named spending plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Budget name (unique by convention, not enforced at storage)
    pub name: String,

    /// The planned total for the budget
    pub total_amount: Money,

    /// Derived cache: `total_amount + income - expenses` over active transactions
    pub remaining_amount: Money,

    /// Whether this budget is active
    pub is_active: bool,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new budget; the remaining amount starts at the total
    pub fn new(name: impl Into<String>, total_amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            name: name.into(),
            total_amount,
            remaining_amount: total_amount,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the derived remaining amount from aggregate totals
    ///
    /// The invariant is `remaining == total + income - expenses` over the
    /// budget's *active* transactions; the sums are supplied by the caller
    /// because transactions are not embedded in the model.
    pub fn recompute_remaining(&mut self, total_income: Money, total_expenses: Money) {
        self.remaining_amount = self.total_amount + total_income - total_expenses;
        self.touch();
    }

    /// Flip the active flag
    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
        self.touch();
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        if self.total_amount.is_negative() {
            return Err(BudgetValidationError::NegativeTotal);
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A lump-sum allocation of funds into a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAllocation {
    /// Unique identifier
    pub id: AllocationId,

    /// The budget this allocation funds
    pub budget_id: BudgetId,

    /// Allocated amount
    pub amount: Money,

    /// When the allocation was made
    pub allocated_at: DateTime<Utc>,

    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BudgetAllocation {
    /// Create a new allocation
    pub fn new(budget_id: BudgetId, amount: Money) -> Self {
        Self {
            id: AllocationId::new(),
            budget_id,
            amount,
            allocated_at: Utc::now(),
            notes: None,
        }
    }

    /// Create a new allocation with notes
    pub fn with_notes(budget_id: BudgetId, amount: Money, notes: impl Into<String>) -> Self {
        let mut allocation = Self::new(budget_id, amount);
        allocation.notes = Some(notes.into());
        allocation
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    NegativeTotal,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NegativeTotal => write!(f, "Budget total cannot be negative"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_budget() {
        let budget = Budget::new("Dec25", Money::from_major(26000));
        assert_eq!(budget.name, "Dec25");
        assert_eq!(budget.total_amount, Money::from_major(26000));
        assert_eq!(budget.remaining_amount, Money::from_major(26000));
        assert!(budget.is_active);
    }

    #[test]
    fn test_recompute_remaining() {
        let mut budget = Budget::new("Test", Money::from_major(1000));
        budget.recompute_remaining(Money::from_major(500), Money::from_major(200));
        assert_eq!(budget.remaining_amount, Money::from_major(1300));

        budget.recompute_remaining(Money::zero(), Money::from_major(1200));
        assert_eq!(budget.remaining_amount, Money::from_cents(-20000));
    }

    #[test]
    fn test_toggle_active() {
        let mut budget = Budget::new("Test", Money::zero());
        budget.toggle_active();
        assert!(!budget.is_active);
        budget.toggle_active();
        assert!(budget.is_active);
    }

    #[test]
    fn test_validation() {
        let mut budget = Budget::new("Valid", Money::from_major(100));
        assert!(budget.validate().is_ok());

        budget.name = "  ".to_string();
        assert_eq!(budget.validate(), Err(BudgetValidationError::EmptyName));

        budget.name = "Valid".to_string();
        budget.total_amount = Money::from_cents(-1);
        assert_eq!(budget.validate(), Err(BudgetValidationError::NegativeTotal));
    }

    #[test]
    fn test_allocation() {
        let budget = Budget::new("Test", Money::zero());
        let allocation =
            BudgetAllocation::with_notes(budget.id, Money::from_major(500), "payday top-up");
        assert_eq!(allocation.budget_id, budget.id);
        assert_eq!(allocation.notes.as_deref(), Some("payday top-up"));
    }

    #[test]
    fn test_serialization() {
        let budget = Budget::new("Test Budget", Money::from_major(100));
        let json = serde_json::to_string(&budget).unwrap();
        let deserialized: Budget = serde_json::from_str(&json).unwrap();
        assert_eq!(budget.id, deserialized.id);
        assert_eq!(budget.remaining_amount, deserialized.remaining_amount);
    }
}
