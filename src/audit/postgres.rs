use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::domain::AuditRecord;

use super::traits::AuditStore;

/// PostgreSQL implementation of the audit store.
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Create a new store with a connection pool.
    pub async fn connect(
        database_url: &str,
        min_connections: u32,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn record(&self, record: &AuditRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audits (id, org_id, expense_json, result_json, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.id)
        .bind(&record.organization_id)
        .bind(&record.expense_json)
        .bind(&record.result_json)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(
        &self,
        organization_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<AuditRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, org_id, expense_json, result_json, created_at
            FROM audits
            WHERE org_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| {
                let created_at: DateTime<Utc> = row.get("created_at");
                AuditRecord {
                    id: row.get("id"),
                    organization_id: row.get("org_id"),
                    expense_json: row.get("expense_json"),
                    result_json: row.get("result_json"),
                    created_at,
                }
            })
            .collect();

        Ok(records)
    }
}
