use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::domain::AuditRecord;

use super::traits::AuditStore;

/// In-memory audit store with one append stream per organization.
///
/// Streams are newest-first and bounded by `cap`. The outer map takes a
/// write lock only when a new organization appears; appends for existing
/// organizations lock just that organization's stream.
#[derive(Debug)]
pub struct InMemoryAuditStore {
    streams: RwLock<HashMap<String, Arc<Mutex<Vec<AuditRecord>>>>>,
    cap: usize,
}

impl InMemoryAuditStore {
    pub fn new(cap: usize) -> Self {
        InMemoryAuditStore {
            streams: RwLock::new(HashMap::new()),
            cap,
        }
    }

    fn stream(&self, organization_id: &str) -> Arc<Mutex<Vec<AuditRecord>>> {
        if let Some(stream) = self.streams.read().get(organization_id) {
            return stream.clone();
        }

        self.streams
            .write()
            .entry(organization_id.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn record(&self, record: &AuditRecord) -> anyhow::Result<()> {
        let stream = self.stream(&record.organization_id);
        let mut records = stream.lock();

        records.insert(0, record.clone());
        records.truncate(self.cap);

        Ok(())
    }

    async fn recent(
        &self,
        organization_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<AuditRecord>> {
        let Some(stream) = self.streams.read().get(organization_id).cloned() else {
            return Ok(Vec::new());
        };

        let records = stream.lock();
        Ok(records.iter().take(limit).cloned().collect())
    }
}
