//! Transaction file parser
//!
//! The export lays two independent blocks side by side on every row:
//! expenses on the left, income on the right. A row may therefore yield
//! zero, one, or two transactions.

use std::io::Read;

use crate::error::LedgerResult;
use crate::import::row::{parse_currency, parse_date, parse_row};
use crate::import::CsvTransaction;

// 0-indexed offsets, with a leading blank column:
//   expense block: 1 date, 2 amount, 3 description, 4 category
//   income block:  6 date, 7 amount, 8 description, 9 category
const EXPENSE_OFFSET: usize = 1;
const INCOME_OFFSET: usize = 6;

/// Parse a transaction export
///
/// The first two non-blank lines are always header rows and are skipped
/// unconditionally; a file with fewer than three non-blank lines yields no
/// transactions. A block contributes only when its date and amount both
/// parse and its category cell is non-empty; malformed blocks are dropped
/// silently.
pub fn parse_transactions(content: &str) -> Vec<CsvTransaction> {
    let rows: Vec<&str> = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if rows.len() <= 2 {
        return Vec::new();
    }

    let mut transactions = Vec::new();

    for row in &rows[2..] {
        let columns = parse_row(row);

        if let Some(txn) = parse_block(&columns, EXPENSE_OFFSET, false) {
            transactions.push(txn);
        }
        if let Some(txn) = parse_block(&columns, INCOME_OFFSET, true) {
            transactions.push(txn);
        }
    }

    transactions
}

/// Parse a transaction export from any readable source
pub fn parse_transactions_from_reader<R: Read>(mut reader: R) -> LedgerResult<Vec<CsvTransaction>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(parse_transactions(&content))
}

fn parse_block(columns: &[String], offset: usize, is_income: bool) -> Option<CsvTransaction> {
    let category = columns.get(offset + 3)?;
    if category.is_empty() {
        return None;
    }

    let date = parse_date(columns.get(offset)?)?;
    let amount = parse_currency(columns.get(offset + 1)?)?;
    let description = columns.get(offset + 2).cloned().unwrap_or_default();

    Some(CsvTransaction {
        date,
        amount,
        description,
        category: category.clone(),
        is_income,
    })
}
