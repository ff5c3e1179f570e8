//! CSV ingestion pipeline
//!
//! Parses two heterogeneous spreadsheet export formats into transient,
//! unpersisted records:
//!
//! - budget files: either a detailed two-table Planned/Actual/Diff. summary
//!   or a simple name/amount list ([`budget`]),
//! - transaction files: a fixed side-by-side expense/income layout
//!   ([`transactions`]).
//!
//! The CSV layout is an *input* contract dictated by an external spreadsheet
//! export; this crate does not define or version it. The
//! [`ImportService`](crate::services::ImportService) reconciles parser output
//! into existing budget data.

pub mod budget;
pub mod row;
pub mod transactions;

use chrono::NaiveDate;

use crate::models::Money;

pub use budget::{detect_format, parse_budget, parse_budget_from_reader, BudgetCsvFormat};
pub use row::{parse_currency, parse_date, parse_row};
pub use transactions::{parse_transactions, parse_transactions_from_reader};

/// A transaction row parsed out of a CSV export, not yet reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTransaction {
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub category: String,
    pub is_income: bool,
}

/// A budget parsed out of a CSV export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvBudget {
    /// Source filename without path or extension
    pub name: String,
    pub items: Vec<CsvBudgetItem>,
}

/// One planned line item of a parsed budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvBudgetItem {
    pub category_name: String,
    pub amount: Money,
    pub is_income: bool,
}

/// Strip directory components and the extension from a source filename
pub(crate) fn file_stem(filename: &str) -> String {
    std::path::Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Dec25.csv"), "Dec25");
        assert_eq!(file_stem("/exports/2025/Dec25PS.csv"), "Dec25PS");
        assert_eq!(file_stem("no_extension"), "no_extension");
        assert_eq!(file_stem(""), "");
    }
}
