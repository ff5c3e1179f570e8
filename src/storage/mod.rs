//! Storage layer for the budget ledger
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! The service layer treats this as an external store: insert/delete/save
//! per repository, plus explicit query methods and a declarative
//! [`TransactionQuery`] instead of ad hoc predicates.

pub mod allocations;
pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod transactions;

pub use allocations::AllocationRepository;
pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use transactions::{TransactionQuery, TransactionRepository};

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub budgets: BudgetRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub allocations: AllocationRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            budgets: BudgetRepository::new(paths.budgets_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            allocations: AllocationRepository::new(paths.allocations_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.budgets.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.allocations.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.budgets.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.allocations.save()?;
        Ok(())
    }
}
