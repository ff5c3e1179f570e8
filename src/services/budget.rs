//! Budget service
//!
//! Budget lifecycle, the remaining-amount invariant, and monthly summary
//! reporting. A budget's remaining amount is always recomputed as
//! `total + income - expenses` over active transactions, never adjusted
//! incrementally.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    months_between, Budget, BudgetAllocation, BudgetId, BudgetMonth, CategoryId, Money, Transaction,
};
use crate::storage::{Storage, TransactionQuery};

/// Aggregates for one monthly cycle of a budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: BudgetMonth,
    pub income: Money,
    pub expenses: Money,
    /// `total_amount + income - expenses` for this cycle
    pub remaining: Money,
}

/// Service for budget operations
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a budget
    pub fn create(&self, name: &str, total_amount: Money) -> LedgerResult<Budget> {
        let budget = Budget::new(name.trim(), total_amount);
        budget
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        Ok(budget)
    }

    /// Rename a budget and change its planned total
    pub fn update(&self, id: BudgetId, name: &str, total_amount: Money) -> LedgerResult<Budget> {
        let mut budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;

        budget.name = name.trim().to_string();
        budget.total_amount = total_amount;
        budget
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        // The total feeds the remaining-amount invariant
        let budget = self.recompute_remaining_inner(budget)?;
        self.storage.budgets.save()?;
        Ok(budget)
    }

    /// Flip a budget's active flag
    pub fn toggle_active(&self, id: BudgetId) -> LedgerResult<Budget> {
        let mut budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;

        budget.toggle_active();
        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        Ok(budget)
    }

    /// Delete a budget and everything it owns
    ///
    /// Cascades to categories, transactions, and allocations; a budget is
    /// never partially deleted.
    pub fn delete(&self, id: BudgetId) -> LedgerResult<()> {
        if self.storage.budgets.get(id)?.is_none() {
            return Err(LedgerError::budget_not_found(id.to_string()));
        }

        self.storage.transactions.delete_for_budget(id)?;
        self.storage.categories.delete_for_budget(id)?;
        self.storage.allocations.delete_for_budget(id)?;
        self.storage.budgets.delete(id)?;

        self.storage.transactions.save()?;
        self.storage.categories.save()?;
        self.storage.allocations.save()?;
        self.storage.budgets.save()
    }

    /// Record a lump-sum allocation into a budget
    pub fn allocate(
        &self,
        budget_id: BudgetId,
        amount: Money,
        notes: Option<&str>,
    ) -> LedgerResult<BudgetAllocation> {
        if self.storage.budgets.get(budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(budget_id.to_string()));
        }

        let allocation = match notes {
            Some(notes) => BudgetAllocation::with_notes(budget_id, amount, notes),
            None => BudgetAllocation::new(budget_id, amount),
        };

        self.storage.allocations.upsert(allocation.clone())?;
        self.storage.allocations.save()?;
        Ok(allocation)
    }

    /// Recompute a budget's remaining amount from its active transactions
    ///
    /// Updates the repository in memory; callers persist when their whole
    /// operation has succeeded.
    pub fn recompute_remaining(&self, id: BudgetId) -> LedgerResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;
        self.recompute_remaining_inner(budget)
    }

    fn recompute_remaining_inner(&self, mut budget: Budget) -> LedgerResult<Budget> {
        let active = self
            .storage
            .transactions
            .find(&TransactionQuery::new().for_budget(budget.id).active_only())?;

        let income_categories = self.income_category_ids(budget.id)?;
        let (income, expenses) = split_totals(&active, &income_categories);

        budget.recompute_remaining(income, expenses);
        self.storage.budgets.upsert(budget.clone())?;
        Ok(budget)
    }

    /// Aggregates for the monthly cycle containing `month`
    ///
    /// Transactions count toward the cycle of their `budget_period`, not
    /// the month of their literal date.
    pub fn month_summary(&self, id: BudgetId, month: BudgetMonth) -> LedgerResult<MonthSummary> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.find(
            &TransactionQuery::new()
                .for_budget(id)
                .active_only()
                .in_period(month),
        )?;

        let income_categories = self.income_category_ids(id)?;
        let (income, expenses) = split_totals(&transactions, &income_categories);

        Ok(MonthSummary {
            month,
            income,
            expenses,
            remaining: budget.total_amount + income - expenses,
        })
    }

    /// Month-by-month summaries from the earliest recorded cycle
    ///
    /// Covers every month from the budget's earliest `budget_period`
    /// through the month containing `through`, ascending; empty when the
    /// budget has no active transactions.
    pub fn history(&self, id: BudgetId, through: NaiveDate) -> LedgerResult<Vec<MonthSummary>> {
        let active = self
            .storage
            .transactions
            .find(&TransactionQuery::new().for_budget(id).active_only())?;

        let earliest = match active.iter().map(|t| t.budget_period).min() {
            Some(earliest) => earliest,
            None => return Ok(Vec::new()),
        };

        months_between(earliest.start(), through)
            .into_iter()
            .map(|month| self.month_summary(id, month))
            .collect()
    }

    fn income_category_ids(&self, budget_id: BudgetId) -> LedgerResult<HashSet<CategoryId>> {
        Ok(self
            .storage
            .categories
            .get_for_budget(budget_id)?
            .into_iter()
            .filter(|c| c.is_income)
            .map(|c| c.id)
            .collect())
    }
}

/// Split active transaction amounts into income and expense sums
///
/// Direction comes from the owning category; a transaction with no category
/// counts as an expense, matching how it would display.
fn split_totals(
    transactions: &[Transaction],
    income_categories: &HashSet<CategoryId>,
) -> (Money, Money) {
    let mut income = Money::zero();
    let mut expenses = Money::zero();

    for txn in transactions {
        let is_income = txn
            .category_id
            .map(|id| income_categories.contains(&id))
            .unwrap_or(false);
        if is_income {
            income += txn.amount;
        } else {
            expenses += txn.amount;
        }
    }

    (income, expenses)
}
