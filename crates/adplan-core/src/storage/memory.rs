//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::plan::Plan;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and scratch plans.
#[derive(Default)]
pub struct MemoryStorage {
    plans: RwLock<HashMap<String, Plan>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, plan: &Plan) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let plan = plan.clone();
        Box::pin(async move {
            self.plans.write().map_err(lock_error)?.insert(id, plan);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Plan>> {
        let id = id.to_string();
        Box::pin(async move {
            let plans = self.plans.read().map_err(lock_error)?;
            plans.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.plans.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let plans = self.plans.read().map_err(lock_error)?;
            let mut ids: Vec<String> = plans.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.plans.read().map_err(lock_error)?.contains_key(&id)) })
    }
}
