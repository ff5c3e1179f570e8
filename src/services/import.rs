//! Import reconciler
//!
//! Merges parsed CSV output into existing budget data: find-or-create
//! matching for budgets and categories, duplicate skipping for transactions,
//! and budget-period inference from the source filename. An import either
//! commits as one batch or fails with a single error; no partial count is
//! ever reported as success.

use std::collections::HashSet;

use log::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::import::{file_stem, CsvBudget, CsvTransaction};
use crate::models::{Budget, BudgetId, BudgetMonth, Category, Money, Transaction};
use crate::services::budget::BudgetService;
use crate::services::category::CategoryService;
use crate::storage::{Storage, TransactionQuery};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Infer the budget period a file's rows belong to from its name
///
/// Accepts a month abbreviation plus a 2-digit year ("Dec25", with an
/// optional ordinal token and separator characters before the digits:
/// "Dec25th", "Dec25PS"), or a full month name plus a bare year
/// ("January2025"). Years below 50 map to the 2000s, the rest to the 1900s.
/// Anything else, including bare numeric prefixes like "13th25", is
/// deliberately left unresolved rather than guessed; the caller falls back
/// to each transaction's own month.
pub fn infer_period_from_filename(filename: &str) -> Option<BudgetMonth> {
    let lower = file_stem(filename).to_lowercase();

    // Month abbreviation + 2-digit year
    for (index, abbrev) in MONTH_ABBREVIATIONS.iter().enumerate() {
        if let Some(rest) = lower.strip_prefix(abbrev) {
            let rest = rest.replace("th", "");
            let digits = rest.trim_matches(|c: char| !c.is_ascii_digit());
            if let Ok(year) = digits.parse::<i32>() {
                if (0..100).contains(&year) {
                    let full_year = if year < 50 { 2000 + year } else { 1900 + year };
                    return BudgetMonth::from_ym(full_year, index as u32 + 1);
                }
            }
        }
    }

    // Full month name + bare year
    for (index, month_name) in MONTH_NAMES.iter().enumerate() {
        if let Some(rest) = lower.strip_prefix(month_name) {
            let digits = rest.trim_matches(|c: char| !c.is_ascii_digit());
            if let Ok(year) = digits.parse::<i32>() {
                return BudgetMonth::from_ym(year, index as u32 + 1);
            }
        }
    }

    None
}

/// Service for reconciling parsed CSV data into the ledger
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Merge a parsed budget file into the ledger
    ///
    /// The budget is matched by exact name; a missing one is created with
    /// the sum of the parsed income items as its total. Matched expense
    /// categories take the parsed allocation; matched income categories are
    /// left untouched, since income categories are funding sources rather
    /// than spending caps. Unmatched names become new categories.
    pub fn import_budget(&self, csv_budget: &CsvBudget) -> LedgerResult<Budget> {
        let budget = match self.storage.budgets.get_by_name(&csv_budget.name)? {
            Some(existing) => existing,
            None => {
                let total_income: Money = csv_budget
                    .items
                    .iter()
                    .filter(|item| item.is_income)
                    .map(|item| item.amount)
                    .sum();

                let budget = Budget::new(csv_budget.name.clone(), total_income);
                debug!("creating budget '{}' from import", budget.name);
                self.storage.budgets.upsert(budget.clone())?;
                budget
            }
        };

        for item in &csv_budget.items {
            match self
                .storage
                .categories
                .get_by_name_in_budget(budget.id, &item.category_name)?
            {
                Some(mut category) => {
                    if !item.is_income {
                        category.allocated_amount = item.amount;
                        category.touch();
                        self.storage.categories.upsert(category)?;
                    }
                }
                None => {
                    let allocated = if item.is_income {
                        Money::zero()
                    } else {
                        item.amount
                    };
                    let category = Category::new(
                        item.category_name.clone(),
                        allocated,
                        item.is_income,
                        Some(budget.id),
                    );
                    debug!("creating category '{}' from budget import", category.name);
                    self.storage.categories.upsert(category)?;
                }
            }
        }

        self.storage.budgets.save()?;
        self.storage.categories.save()?;
        Ok(budget)
    }

    /// Merge parsed transactions into an existing budget
    ///
    /// Rows matching an existing transaction on (calendar day, amount,
    /// description) are skipped, which makes re-importing the same file a
    /// no-op. Each row's period comes from the filename when inference
    /// succeeds, else from the row's own date. Returns the number of newly
    /// inserted transactions.
    pub fn import_transactions(
        &self,
        csv_transactions: &[CsvTransaction],
        budget_id: BudgetId,
        filename: Option<&str>,
    ) -> LedgerResult<usize> {
        if self.storage.budgets.get(budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(budget_id.to_string()));
        }

        let inferred_period = filename.and_then(infer_period_from_filename);

        // Dedup key set over everything already in the budget
        let existing = self
            .storage
            .transactions
            .find(&TransactionQuery::new().for_budget(budget_id))?;
        let mut seen: HashSet<(chrono::NaiveDate, i64, String)> = existing
            .iter()
            .map(|t| (t.date, t.amount.cents(), t.description.clone()))
            .collect();

        let mut touched_categories = HashSet::new();
        let mut count = 0;

        debug!("processing {} parsed transactions", csv_transactions.len());
        for csv_txn in csv_transactions {
            let category = self.find_or_create_category(budget_id, csv_txn)?;

            let key = (
                csv_txn.date,
                csv_txn.amount.cents(),
                csv_txn.description.clone(),
            );
            if seen.contains(&key) {
                debug!(
                    "skipping duplicate transaction: {} - {}",
                    csv_txn.description, csv_txn.amount
                );
                continue;
            }
            seen.insert(key);

            let period = inferred_period.unwrap_or_else(|| BudgetMonth::containing(csv_txn.date));
            let txn = Transaction::with_details(
                csv_txn.amount,
                csv_txn.description.clone(),
                csv_txn.date,
                budget_id,
                category.id,
                Some(period),
            );
            self.storage.transactions.upsert(txn)?;

            touched_categories.insert(category.id);
            count += 1;
        }
        debug!("imported {} new transactions", count);

        let categories = CategoryService::new(self.storage);
        for category_id in touched_categories {
            categories.recompute_used_amount(category_id)?;
        }
        BudgetService::new(self.storage).recompute_remaining(budget_id)?;

        self.storage.transactions.save()?;
        self.storage.categories.save()?;
        self.storage.budgets.save()?;

        Ok(count)
    }

    fn find_or_create_category(
        &self,
        budget_id: BudgetId,
        csv_txn: &CsvTransaction,
    ) -> LedgerResult<Category> {
        if let Some(existing) = self
            .storage
            .categories
            .get_by_name_in_budget(budget_id, &csv_txn.category)?
        {
            return Ok(existing);
        }

        // Categories discovered through transactions start unallocated
        let category = Category::new(
            csv_txn.category.clone(),
            Money::zero(),
            csv_txn.is_income,
            Some(budget_id),
        );
        debug!("creating category '{}' from transaction import", category.name);
        self.storage.categories.upsert(category.clone())?;
        Ok(category)
    }
}
