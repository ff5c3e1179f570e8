//! Transaction repository for JSON storage
//!
//! Call sites describe what they want with a [`TransactionQuery`] value
//! instead of building ad hoc predicates; the repository interprets it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{BudgetId, BudgetMonth, CategoryId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TransactionData {
    pub transactions: Vec<Transaction>,
}

/// Declarative filter interpreted by [`TransactionRepository::find`]
///
/// Unset fields do not constrain the result. The date range is half-open:
/// `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionQuery {
    pub budget_id: Option<BudgetId>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
    pub period: Option<BudgetMonth>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_budget(mut self, budget_id: BudgetId) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    pub fn for_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.is_active = Some(true);
        self
    }

    pub fn in_period(mut self, period: BudgetMonth) -> Self {
        self.period = Some(period);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        if let Some(budget_id) = self.budget_id {
            if txn.budget_id != Some(budget_id) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if txn.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(is_active) = self.is_active {
            if txn.is_active != is_active {
                return false;
            }
        }
        if let Some(period) = self.period {
            if txn.budget_period != period {
                return false;
            }
        }
        if let Some(from) = self.from {
            if txn.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if txn.date >= to {
                return false;
            }
        }
        true
    }
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            transactions: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        transactions.clear();
        for txn in file_data.transactions {
            transactions.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = transactions.values().cloned().collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_json_atomic(&self.path, &TransactionData { transactions: list })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(transactions.get(&id).cloned())
    }

    /// Find transactions matching a query, newest first
    pub fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, LedgerError> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = transactions
            .values()
            .filter(|txn| query.matches(txn))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(list)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), LedgerError> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        transactions.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, LedgerError> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(transactions.remove(&id).is_some())
    }

    /// Delete every transaction belonging to a budget (cascade)
    pub fn delete_for_budget(&self, budget_id: BudgetId) -> Result<usize, LedgerError> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = transactions.len();
        transactions.retain(|_, t| t.budget_id != Some(budget_id));
        Ok(before - transactions.len())
    }

    /// Delete every transaction belonging to a category (cascade)
    pub fn delete_for_category(&self, category_id: CategoryId) -> Result<usize, LedgerError> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = transactions.len();
        transactions.retain(|_, t| t.category_id != Some(category_id));
        Ok(before - transactions.len())
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        let transactions = self
            .transactions
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(transactions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        (temp_dir, TransactionRepository::new(path))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn_for(
        budget_id: BudgetId,
        category_id: CategoryId,
        amount: i64,
        day: NaiveDate,
    ) -> Transaction {
        Transaction::with_details(
            Money::from_major(amount),
            "test",
            day,
            budget_id,
            category_id,
            None,
        )
    }

    #[test]
    fn test_query_by_budget_and_activity() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let category_id = CategoryId::new();

        let active = txn_for(budget_id, category_id, 10, date(2025, 1, 5));
        let mut inactive = txn_for(budget_id, category_id, 20, date(2025, 1, 6));
        inactive.soft_delete();
        let other = Transaction::new(Money::from_major(30), "other", date(2025, 1, 7));

        repo.upsert(active.clone()).unwrap();
        repo.upsert(inactive).unwrap();
        repo.upsert(other).unwrap();

        let found = repo
            .find(&TransactionQuery::new().for_budget(budget_id).active_only())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);
    }

    #[test]
    fn test_query_by_period_and_date_range() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let category_id = CategoryId::new();

        let december = txn_for(budget_id, category_id, 10, date(2025, 12, 17));
        let january = txn_for(budget_id, category_id, 20, date(2026, 1, 2));
        repo.upsert(december.clone()).unwrap();
        repo.upsert(january.clone()).unwrap();

        let dec_period = BudgetMonth::from_ym(2025, 12).unwrap();
        let found = repo
            .find(&TransactionQuery::new().in_period(dec_period))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, december.id);

        // Half-open range: from inclusive, to exclusive
        let found = repo
            .find(&TransactionQuery::new().between(date(2025, 12, 17), date(2026, 1, 2)))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, december.id);
    }

    #[test]
    fn test_results_sorted_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let category_id = CategoryId::new();

        repo.upsert(txn_for(budget_id, category_id, 1, date(2025, 1, 1)))
            .unwrap();
        repo.upsert(txn_for(budget_id, category_id, 2, date(2025, 3, 1)))
            .unwrap();
        repo.upsert(txn_for(budget_id, category_id, 3, date(2025, 2, 1)))
            .unwrap();

        let found = repo.find(&TransactionQuery::new()).unwrap();
        let dates: Vec<NaiveDate> = found.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(2025, 3, 1), date(2025, 2, 1), date(2025, 1, 1)]);
    }

    #[test]
    fn test_cascade_deletes() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let category_id = CategoryId::new();
        repo.upsert(txn_for(budget_id, category_id, 1, date(2025, 1, 1)))
            .unwrap();
        repo.upsert(txn_for(budget_id, CategoryId::new(), 2, date(2025, 1, 2)))
            .unwrap();

        assert_eq!(repo.delete_for_category(category_id).unwrap(), 1);
        assert_eq!(repo.delete_for_budget(budget_id).unwrap(), 1);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let txn = Transaction::new(Money::from_major(50), "persisted", date(2025, 6, 1));
        let id = txn.id;
        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().description, "persisted");
    }
}
