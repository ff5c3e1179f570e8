//! Budget allocation repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{AllocationId, BudgetAllocation, BudgetId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable allocation file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AllocationData {
    pub allocations: Vec<BudgetAllocation>,
}

/// Repository for budget allocation persistence
pub struct AllocationRepository {
    path: PathBuf,
    allocations: RwLock<HashMap<AllocationId, BudgetAllocation>>,
}

impl AllocationRepository {
    /// Create a new allocation repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            allocations: RwLock::new(HashMap::new()),
        }
    }

    /// Load allocations from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: AllocationData = read_json(&self.path)?;

        let mut allocations = self
            .allocations
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        allocations.clear();
        for allocation in file_data.allocations {
            allocations.insert(allocation.id, allocation);
        }

        Ok(())
    }

    /// Save allocations to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let allocations = self
            .allocations
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = allocations.values().cloned().collect();
        list.sort_by(|a, b| b.allocated_at.cmp(&a.allocated_at));

        write_json_atomic(&self.path, &AllocationData { allocations: list })
    }

    /// Get all allocations for a budget, newest first
    pub fn get_for_budget(&self, budget_id: BudgetId) -> Result<Vec<BudgetAllocation>, LedgerError> {
        let allocations = self
            .allocations
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = allocations
            .values()
            .filter(|a| a.budget_id == budget_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.allocated_at.cmp(&a.allocated_at));
        Ok(list)
    }

    /// Insert or update an allocation
    pub fn upsert(&self, allocation: BudgetAllocation) -> Result<(), LedgerError> {
        let mut allocations = self
            .allocations
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        allocations.insert(allocation.id, allocation);
        Ok(())
    }

    /// Delete every allocation belonging to a budget (cascade)
    pub fn delete_for_budget(&self, budget_id: BudgetId) -> Result<usize, LedgerError> {
        let mut allocations = self
            .allocations
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = allocations.len();
        allocations.retain(|_, a| a.budget_id != budget_id);
        Ok(before - allocations.len())
    }
}
