use std::sync::Arc;

use crate::error::{Result, ServerError};
use crate::record::{Record, RecordFields, RecordId, RecordStore};

/// Record manager.
///
/// Every operation is a single independent request against the store.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    /// Create a new [`RecordService`] over a store handle.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Insert a record and return the id assigned by the store.
    pub async fn create(&self, fields: &RecordFields) -> Result<RecordId> {
        let id = self.store.insert(fields).await?;
        tracing::debug!(record_id = id, "record created");
        Ok(id)
    }

    /// Every record, ordered by id.
    pub async fn list(&self) -> Result<Vec<Record>> {
        self.store.list().await
    }

    /// Single record, [`ServerError::RecordNotFound`] if absent.
    pub async fn get(&self, id: RecordId) -> Result<Record> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServerError::RecordNotFound(id))
    }

    /// Overwrite name, email and password of record `id`.
    pub async fn update(&self, id: RecordId, fields: &RecordFields) -> Result<()> {
        if !self.store.update(id, fields).await? {
            return Err(ServerError::RecordNotFound(id));
        }

        tracing::debug!(record_id = id, "record updated");
        Ok(())
    }

    /// Remove record `id`.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(ServerError::RecordNotFound(id));
        }

        tracing::debug!(record_id = id, "record deleted");
        Ok(())
    }

    /// Release the store, called once on shutdown.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
