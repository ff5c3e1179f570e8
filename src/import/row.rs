//! CSV row tokenizer and field parsers
//!
//! Best-effort parsing over dirty spreadsheet exports: malformed fields
//! yield `None` and the row is simply worth less, never an error.

use chrono::NaiveDate;

use crate::models::Money;

/// Split a CSV line on commas, respecting double-quoted fields
///
/// Quote characters toggle an "inside quotes" state and are stripped from
/// the output, so `a,"1,000",c` yields `["a", "1,000", "c"]`. Embedded-quote
/// escaping (`""`) is not supported; the upstream spreadsheet export never
/// produces it, and a doubled quote simply toggles twice.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            inside_quotes = !inside_quotes;
        } else if ch == ',' && !inside_quotes {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}

/// Parse a currency cell like `$1,234.50` into exact cents
///
/// Currency symbols, thousands separators, stray quotes, and surrounding
/// whitespace are stripped; `None` if the remainder is not a decimal number.
pub fn parse_currency(field: &str) -> Option<Money> {
    Money::parse(field).ok()
}

/// Parse a date cell in the export's fixed `M/D/YYYY` format
///
/// Zero-padding is not required: `1/5/2025` and `12/30/2025` both parse.
pub fn parse_date(field: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(field.trim(), "%m/%d/%Y").ok()
}
