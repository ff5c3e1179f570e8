//! centavo - personal budget ledger engine
//!
//! This library keeps a budget's totals, category usage, and installment
//! schedules consistent as transactions are created, edited, soft-deleted,
//! and bulk-imported from spreadsheet CSV exports. It is the engine behind
//! a budgeting app; rendering, charts, and appearance are someone else's
//! job.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `models`: Core data models (budgets, categories, transactions, money,
//!   monthly periods)
//! - `storage`: JSON file storage layer, the persistence collaborator
//! - `import`: CSV tokenizer and the two spreadsheet-export parsers
//! - `services`: Business logic, from ledger operations to the import
//!   reconciler
//!
//! # Example
//!
//! ```rust,no_run
//! use centavo::config::LedgerPaths;
//! use centavo::import::parse_transactions;
//! use centavo::services::{BudgetService, ImportService};
//! use centavo::storage::Storage;
//!
//! # fn main() -> centavo::LedgerResult<()> {
//! let paths = LedgerPaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let budget = BudgetService::new(&storage).create("Dec25", Default::default())?;
//!
//! let rows = parse_transactions(&std::fs::read_to_string("Dec25PS.csv")?);
//! let inserted =
//!     ImportService::new(&storage).import_transactions(&rows, budget.id, Some("Dec25PS.csv"))?;
//! println!("imported {} transactions", inserted);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
