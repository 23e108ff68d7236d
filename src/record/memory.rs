//! Process-local store, used when no database is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::record::{Record, RecordFields, RecordId, RecordStore};

#[derive(Debug, Default)]
struct Table {
    last_id: RecordId,
    rows: BTreeMap<RecordId, Record>,
}

/// In-memory [`RecordStore`]. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    table: RwLock<Table>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, fields: &RecordFields) -> Result<RecordId> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(id, fields.clone().into_record(id));

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: RecordId, fields: &RecordFields) -> Result<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(record) => {
                *record = fields.clone().into_record(id);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
