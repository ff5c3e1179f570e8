//! Core data models for the budget ledger
//!
//! This module contains all the data structures that represent the budgeting
//! domain: budgets, categories, transactions, allocations, and the month
//! arithmetic they share.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;

pub use budget::{Budget, BudgetAllocation};
pub use category::{Category, CategoryDraft, InstallmentPlan};
pub use ids::{AllocationId, BudgetId, CategoryId, TransactionId};
pub use money::Money;
pub use period::{add_months, is_same_month, month_bounds, months_between, BudgetMonth};
pub use transaction::Transaction;
