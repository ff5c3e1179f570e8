//! Transaction service
//!
//! The ledger's state machine: create, edit, hard/soft delete, and restore,
//! each leaving the category usage and budget remaining caches consistent.
//! Overflow past a category's allocation is signalled, never blocked; the
//! caller decides whether to confirm or abort.

use chrono::NaiveDate;
use log::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BudgetId, BudgetMonth, Category, CategoryId, Money, Transaction, TransactionId,
};
use crate::services::budget::BudgetService;
use crate::services::category::CategoryService;
use crate::storage::{Storage, TransactionQuery};

/// Input for creating a transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub budget_id: BudgetId,
    pub category_id: CategoryId,
    /// Attributed cycle; defaults to the month of `date`
    pub period: Option<BudgetMonth>,
}

/// Input for editing a transaction in place
///
/// The attributed cycle is not editable; it stays what it was at creation
/// or import time.
#[derive(Debug, Clone)]
pub struct EditTransactionInput {
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub budget_id: BudgetId,
    pub category_id: CategoryId,
}

/// Service for transaction operations
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Append a new active transaction and reconcile the caches
    pub fn create(&self, input: CreateTransactionInput) -> LedgerResult<Transaction> {
        if self.storage.budgets.get(input.budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(input.budget_id.to_string()));
        }
        if self.storage.categories.get(input.category_id)?.is_none() {
            return Err(LedgerError::category_not_found(input.category_id.to_string()));
        }

        let txn = Transaction::with_details(
            input.amount,
            input.description,
            input.date,
            input.budget_id,
            input.category_id,
            input.period,
        );
        self.storage.transactions.upsert(txn.clone())?;

        CategoryService::new(self.storage).recompute_used_amount(input.category_id)?;
        BudgetService::new(self.storage).recompute_remaining(input.budget_id)?;

        self.persist()?;
        Ok(txn)
    }

    /// Overwrite a transaction in place and reconcile every touched cache
    ///
    /// When the category or budget changed, the old ones are recomputed too
    /// so the moved amount is reversed there.
    pub fn edit(&self, id: TransactionId, input: EditTransactionInput) -> LedgerResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        if self.storage.budgets.get(input.budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(input.budget_id.to_string()));
        }
        if self.storage.categories.get(input.category_id)?.is_none() {
            return Err(LedgerError::category_not_found(input.category_id.to_string()));
        }

        let old_category = txn.category_id;
        let old_budget = txn.budget_id;

        txn.amount = input.amount;
        txn.description = input.description;
        txn.date = input.date;
        txn.budget_id = Some(input.budget_id);
        txn.category_id = Some(input.category_id);
        txn.touch();
        self.storage.transactions.upsert(txn.clone())?;

        self.reconcile(old_category, old_budget, &txn)?;
        self.persist()?;
        Ok(txn)
    }

    /// Remove a transaction entirely and reverse its contribution
    pub fn hard_delete(&self, id: TransactionId) -> LedgerResult<()> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        debug!("hard-deleted transaction {}", id);

        self.reconcile(txn.category_id, txn.budget_id, &txn)?;
        self.persist()
    }

    /// Mark a transaction inactive, keeping it for history and restore
    pub fn soft_delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        self.set_active(id, false)
    }

    /// Bring a soft-deleted transaction back into the ledger
    pub fn restore(&self, id: TransactionId) -> LedgerResult<Transaction> {
        self.set_active(id, true)
    }

    fn set_active(&self, id: TransactionId, active: bool) -> LedgerResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        if active {
            txn.restore();
        } else {
            txn.soft_delete();
        }
        self.storage.transactions.upsert(txn.clone())?;

        self.reconcile(txn.category_id, txn.budget_id, &txn)?;
        self.persist()?;
        Ok(txn)
    }

    /// Would booking `amount` against `category` exceed its allocation?
    ///
    /// Pure predicate: when `excluding` is an existing transaction of the
    /// same category, its prior contribution is removed first so an edit is
    /// not double-counted. The engine never blocks on overflow; the caller
    /// gates a confirm-to-proceed step with this.
    pub fn check_overflow(
        &self,
        amount: Money,
        category: &Category,
        excluding: Option<&Transaction>,
    ) -> bool {
        let mut used = category.used_amount;

        if let Some(existing) = excluding {
            if existing.category_id == Some(category.id) {
                used -= existing.amount;
            }
        }

        used + amount > category.allocated_amount
    }

    /// Whether a category may take a transaction dated `date`
    ///
    /// Archived and expired categories are ineligible, as is an installment
    /// category that already has an active transaction booked in that
    /// calendar month (ignoring `excluding`, the transaction being edited).
    pub fn is_category_eligible(
        &self,
        category: &Category,
        date: NaiveDate,
        excluding: Option<&Transaction>,
    ) -> LedgerResult<bool> {
        if !category.is_valid_for(date) {
            return Ok(false);
        }

        if category.is_installment {
            let transactions = self
                .storage
                .transactions
                .find(&TransactionQuery::new().for_category(category.id))?;
            if category.has_transaction_in_month(&transactions, date, excluding) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Categories of a budget eligible for a transaction dated `date`
    pub fn eligible_categories(
        &self,
        budget_id: BudgetId,
        date: NaiveDate,
        excluding: Option<&Transaction>,
    ) -> LedgerResult<Vec<Category>> {
        let mut eligible = Vec::new();
        for category in self.storage.categories.get_for_budget(budget_id)? {
            if self.is_category_eligible(&category, date, excluding)? {
                eligible.push(category);
            }
        }
        Ok(eligible)
    }

    // Recompute caches for the categories and budgets a mutation touched.
    fn reconcile(
        &self,
        old_category: Option<CategoryId>,
        old_budget: Option<BudgetId>,
        txn: &Transaction,
    ) -> LedgerResult<()> {
        let categories = CategoryService::new(self.storage);
        let budgets = BudgetService::new(self.storage);

        if let Some(id) = old_category {
            categories.recompute_used_amount(id)?;
        }
        if txn.category_id != old_category {
            if let Some(id) = txn.category_id {
                categories.recompute_used_amount(id)?;
            }
        }

        if let Some(id) = old_budget {
            budgets.recompute_remaining(id)?;
        }
        if txn.budget_id != old_budget {
            if let Some(id) = txn.budget_id {
                budgets.recompute_remaining(id)?;
            }
        }

        Ok(())
    }

    fn persist(&self) -> LedgerResult<()> {
        self.storage.transactions.save()?;
        self.storage.categories.save()?;
        self.storage.budgets.save()
    }
}
