//! Category service
//!
//! Business logic for category lifecycle: creation from validated drafts,
//! installment configuration, usage recomputation, and the archive-or-delete
//! decision when a category is edited out of a budget.

use log::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetId, Category, CategoryDraft, CategoryId, InstallmentPlan, Money};
use crate::storage::{Storage, TransactionQuery};

/// What happened to a category removed from a budget form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The category had transaction history and was archived
    Archived,
    /// The category had no history and was hard-deleted
    Deleted,
}

/// Service for category operations
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate a draft against its budget's existing categories
    ///
    /// Duplicate names are rejected case-insensitively; `editing` exempts
    /// the category currently being edited from its own name.
    pub fn validate_draft(
        &self,
        draft: &CategoryDraft,
        budget_id: BudgetId,
        editing: Option<CategoryId>,
    ) -> LedgerResult<()> {
        draft
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if let Some(existing) = self
            .storage
            .categories
            .get_by_name_in_budget(budget_id, draft.name.trim())?
        {
            if Some(existing.id) != editing {
                return Err(LedgerError::Validation(format!(
                    "Category '{}' already exists in this budget",
                    draft.name.trim()
                )));
            }
        }

        Ok(())
    }

    /// Create a category from a validated draft
    pub fn create(&self, draft: &CategoryDraft, budget_id: BudgetId) -> LedgerResult<Category> {
        self.validate_draft(draft, budget_id, None)?;

        let mut category = Category::new(
            draft.name.trim(),
            draft.allocated_amount,
            draft.is_income,
            Some(budget_id),
        );

        if let Some(plan) = &draft.installment {
            category.configure_installment(
                plan.monthly_payment,
                plan.total_amount,
                plan.months,
                plan.start_date,
            );
        }

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        Ok(category)
    }

    /// Create an installment category directly from its plan
    pub fn create_installment(
        &self,
        name: &str,
        allocated_amount: Money,
        plan: InstallmentPlan,
        budget_id: BudgetId,
    ) -> LedgerResult<Category> {
        let mut draft = CategoryDraft::new(name, allocated_amount, false);
        draft.installment = Some(plan);
        self.create(&draft, budget_id)
    }

    /// Rename a category and change its allocation
    pub fn update(
        &self,
        id: CategoryId,
        name: &str,
        allocated_amount: Money,
    ) -> LedgerResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        if let Some(budget_id) = category.budget_id {
            let draft = CategoryDraft::new(name, allocated_amount, category.is_income);
            self.validate_draft(&draft, budget_id, Some(id))?;
        }

        category.name = name.trim().to_string();
        category.allocated_amount = allocated_amount;
        category.touch();

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        Ok(category)
    }

    /// Reconfigure an existing category as a fixed-term installment
    pub fn configure_installment(
        &self,
        id: CategoryId,
        plan: InstallmentPlan,
    ) -> LedgerResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        category.configure_installment(
            plan.monthly_payment,
            plan.total_amount,
            plan.months,
            plan.start_date,
        );

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        Ok(category)
    }

    /// Recompute a category's usage cache from its active transactions
    ///
    /// One full rescan, applied after every mutation that could have drifted
    /// the cache. Updates the repository in memory; callers persist when
    /// their whole operation has succeeded.
    pub fn recompute_used_amount(&self, id: CategoryId) -> LedgerResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        let transactions = self
            .storage
            .transactions
            .find(&TransactionQuery::new().for_category(id))?;

        category.update_used_amount(&transactions);
        self.storage.categories.upsert(category.clone())?;
        Ok(category)
    }

    /// Archive a category that has history, hard-delete one that doesn't
    ///
    /// Removing a category from a budget form must not orphan its
    /// transactions; archiving keeps them while hiding the category.
    pub fn archive_or_delete(&self, id: CategoryId) -> LedgerResult<ArchiveOutcome> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        let history = self
            .storage
            .transactions
            .find(&TransactionQuery::new().for_category(id))?;

        let outcome = if history.is_empty() {
            self.storage.categories.delete(id)?;
            debug!("deleted category {} with no history", category.name);
            ArchiveOutcome::Deleted
        } else {
            category.archive();
            self.storage.categories.upsert(category)?;
            ArchiveOutcome::Archived
        };

        self.storage.categories.save()?;
        Ok(outcome)
    }

    /// Categories of a budget, honoring the archived-visibility setting
    pub fn list_for_budget(
        &self,
        budget_id: BudgetId,
        include_archived: bool,
    ) -> LedgerResult<Vec<Category>> {
        let categories = self.storage.categories.get_for_budget(budget_id)?;
        Ok(categories
            .into_iter()
            .filter(|c| include_archived || c.is_active)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use crate::models::{Budget, Transaction};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn setup_budget(storage: &Storage) -> BudgetId {
        let budget = Budget::new("Test", Money::from_major(1000));
        let id = budget.id;
        storage.budgets.upsert(budget).unwrap();
        id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_category() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let draft = CategoryDraft::new("Groceries", Money::from_major(1000), false);
        let category = service.create(&draft, budget_id).unwrap();

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.budget_id, Some(budget_id));
        assert!(storage.categories.get(category.id).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_name_rejected_case_insensitively() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let draft = CategoryDraft::new("Groceries", Money::from_major(1000), false);
        service.create(&draft, budget_id).unwrap();

        let dup = CategoryDraft::new("GROCERIES", Money::from_major(500), false);
        let err = service.create(&dup, budget_id).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_update_keeps_own_name() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let draft = CategoryDraft::new("Rent", Money::from_major(500), false);
        let category = service.create(&draft, budget_id).unwrap();

        // Re-saving under the same name is not a duplicate
        let updated = service
            .update(category.id, "Rent", Money::from_major(600))
            .unwrap();
        assert_eq!(updated.allocated_amount, Money::from_major(600));
    }

    #[test]
    fn test_create_installment() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let plan = InstallmentPlan {
            monthly_payment: Money::from_major(500),
            total_amount: Money::from_major(1500),
            months: 3,
            start_date: date(2025, 1, 1),
        };
        let category = service
            .create_installment("Phone Plan", Money::from_major(500), plan, budget_id)
            .unwrap();

        assert!(category.is_installment);
        assert_eq!(category.installment_end_date, Some(date(2025, 4, 1)));
    }

    #[test]
    fn test_recompute_used_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let draft = CategoryDraft::new("Food", Money::from_major(100), false);
        let category = service.create(&draft, budget_id).unwrap();

        let mut active = Transaction::with_details(
            Money::from_major(30),
            "lunch",
            date(2025, 1, 5),
            budget_id,
            category.id,
            None,
        );
        storage.transactions.upsert(active.clone()).unwrap();

        let recomputed = service.recompute_used_amount(category.id).unwrap();
        assert_eq!(recomputed.used_amount, Money::from_major(30));

        active.soft_delete();
        storage.transactions.upsert(active).unwrap();

        let recomputed = service.recompute_used_amount(category.id).unwrap();
        assert_eq!(recomputed.used_amount, Money::zero());
    }

    #[test]
    fn test_archive_or_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        let with_history = service
            .create(
                &CategoryDraft::new("Used", Money::from_major(100), false),
                budget_id,
            )
            .unwrap();
        let unused = service
            .create(
                &CategoryDraft::new("Unused", Money::from_major(100), false),
                budget_id,
            )
            .unwrap();

        let txn = Transaction::with_details(
            Money::from_major(10),
            "x",
            date(2025, 1, 5),
            budget_id,
            with_history.id,
            None,
        );
        storage.transactions.upsert(txn).unwrap();

        assert_eq!(
            service.archive_or_delete(with_history.id).unwrap(),
            ArchiveOutcome::Archived
        );
        let archived = storage.categories.get(with_history.id).unwrap().unwrap();
        assert!(!archived.is_active);

        assert_eq!(
            service.archive_or_delete(unused.id).unwrap(),
            ArchiveOutcome::Deleted
        );
        assert!(storage.categories.get(unused.id).unwrap().is_none());
    }

    #[test]
    fn test_list_for_budget_hides_archived() {
        let (_temp_dir, storage) = create_test_storage();
        let budget_id = setup_budget(&storage);
        let service = CategoryService::new(&storage);

        service
            .create(
                &CategoryDraft::new("Visible", Money::from_major(100), false),
                budget_id,
            )
            .unwrap();
        let archived = service
            .create(
                &CategoryDraft::new("Hidden", Money::from_major(100), false),
                budget_id,
            )
            .unwrap();

        let txn = Transaction::with_details(
            Money::from_major(1),
            "x",
            date(2025, 1, 1),
            budget_id,
            archived.id,
            None,
        );
        storage.transactions.upsert(txn).unwrap();
        service.archive_or_delete(archived.id).unwrap();

        assert_eq!(service.list_for_budget(budget_id, false).unwrap().len(), 1);
        assert_eq!(service.list_for_budget(budget_id, true).unwrap().len(), 2);
    }
}
