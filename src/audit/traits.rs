use async_trait::async_trait;

use crate::domain::AuditRecord;

/// Append-only persistence for audit records.
///
/// Records are never updated or deleted by this service. Appends within
/// one organization's stream happen in evaluation completion order;
/// unrelated organizations never contend.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one record to the organization's audit stream.
    async fn record(&self, record: &AuditRecord) -> anyhow::Result<()>;

    /// Most recent records for an organization, newest first.
    async fn recent(&self, organization_id: &str, limit: usize)
        -> anyhow::Result<Vec<AuditRecord>>;
}
