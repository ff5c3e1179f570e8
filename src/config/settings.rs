//! User settings
//!
//! Process-wide defaults are an explicit value object handed to display
//! layers, not global mutable state.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::storage::file_io::{read_json, write_json_atomic};

fn default_schema_version() -> u32 {
    1
}

fn default_currency_code() -> String {
    "PHP".to_string()
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// ISO 4217 code of the display currency
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Whether archived categories appear in listings
    #[serde(default)]
    pub show_archived_categories: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_code: default_currency_code(),
            show_archived_categories: false,
        }
    }
}

/// Currency codes offered to the user
pub const SUPPORTED_CURRENCIES: [&str; 11] = [
    "USD", "EUR", "GBP", "JPY", "CNY", "CAD", "AUD", "CHF", "HKD", "SGD", "PHP",
];

impl Settings {
    /// Load settings, writing the defaults if no file exists yet
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let path = paths.settings_file();
        if path.exists() {
            read_json(path)
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Persist settings
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        write_json_atomic(paths.settings_file(), self)
    }

    /// Symbol for the configured currency, falling back to the code itself
    pub fn currency_symbol(&self) -> &str {
        match self.currency_code.as_str() {
            "PHP" => "₱",
            "USD" | "CAD" | "AUD" | "HKD" | "SGD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "CHF" => "CHF ",
            other => other,
        }
    }
}
