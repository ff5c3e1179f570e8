//! Budget file parsers
//!
//! Two export formats exist in the wild. The detailed format is a monthly
//! summary sheet with side-by-side expense and income tables and
//! Planned/Actual/Diff. columns; the simple format is a bare name/amount
//! list. Format selection is by content sniffing.

use std::io::Read;

use crate::error::LedgerResult;
use crate::import::row::{parse_currency, parse_row};
use crate::import::{file_stem, CsvBudget, CsvBudgetItem};

/// Which parser a budget file will be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetCsvFormat {
    /// Side-by-side expense/income tables with Planned/Actual/Diff. columns
    Detailed,
    /// Two-column name/amount list
    Simple,
}

/// Sniff the format from file content
///
/// The literal column headers "Planned", "Actual", and "Diff." only ever
/// appear in the detailed summary export.
pub fn detect_format(content: &str) -> BudgetCsvFormat {
    if content.contains("Planned") && content.contains("Actual") && content.contains("Diff.") {
        BudgetCsvFormat::Detailed
    } else {
        BudgetCsvFormat::Simple
    }
}

/// Parse a budget export, selecting the parser by content
///
/// `filename` is used only to name the resulting budget (path and extension
/// are stripped), never for path resolution.
pub fn parse_budget(content: &str, filename: &str) -> CsvBudget {
    let name = file_stem(filename);
    let items = match detect_format(content) {
        BudgetCsvFormat::Detailed => parse_detailed(content),
        BudgetCsvFormat::Simple => parse_simple(content),
    };
    CsvBudget { name, items }
}

/// Parse a budget export from any readable source
pub fn parse_budget_from_reader<R: Read>(mut reader: R, filename: &str) -> LedgerResult<CsvBudget> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(parse_budget(&content, filename))
}

/// Reserved header tokens of the detailed export's expense table
///
/// Matched literally; any other string in the name column is treated as a
/// category name rather than guessed to be a header.
const EXPENSE_HEADER_TOKENS: [&str; 2] = ["Totals", "Expenses"];

/// Reserved header tokens of the detailed export's income table
const INCOME_HEADER_TOKENS: [&str; 2] = ["Totals", "Income"];

// Detailed layout, 0-indexed with a leading blank column:
//   expense name at 1, planned amount at 3; income name at 7, planned at 9.
fn parse_detailed(content: &str) -> Vec<CsvBudgetItem> {
    let mut items = Vec::new();

    for line in content.lines() {
        let columns = parse_row(line.trim_end_matches('\r'));
        if columns.len() <= 9 {
            continue;
        }

        // Expense side
        let name = columns[1].as_str();
        if !name.is_empty() && !EXPENSE_HEADER_TOKENS.contains(&name) {
            if let Some(amount) = parse_currency(&columns[3]) {
                if amount.is_positive() {
                    items.push(CsvBudgetItem {
                        category_name: name.to_string(),
                        amount,
                        is_income: false,
                    });
                }
            }
        }

        // Income side
        let name = columns[7].as_str();
        if !name.is_empty() && !INCOME_HEADER_TOKENS.contains(&name) {
            if let Some(amount) = parse_currency(&columns[9]) {
                if amount.is_positive() {
                    items.push(CsvBudgetItem {
                        category_name: name.to_string(),
                        amount,
                        is_income: true,
                    });
                }
            }
        }
    }

    items
}

// Simple layout: name at column 1, amount at column 2. The export has no
// income table, so every item is an expense allocation.
fn parse_simple(content: &str) -> Vec<CsvBudgetItem> {
    let mut items = Vec::new();

    for line in content.lines() {
        let columns = parse_row(line.trim_end_matches('\r'));
        if columns.len() <= 2 {
            continue;
        }

        let name = columns[1].as_str();
        if name.is_empty() {
            continue;
        }

        if let Some(amount) = parse_currency(&columns[2]) {
            if amount.is_positive() {
                items.push(CsvBudgetItem {
                    category_name: name.to_string(),
                    amount,
                    is_income: false,
                });
            }
        }
    }

    items
}
