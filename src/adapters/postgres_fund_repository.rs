use crate::adapters::bounded;
use crate::domains::{Fund, FundRepository, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PostgresFundRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresFundRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(sqlx::FromRow)]
struct FundRow {
    id: Uuid,
    contributor_id: Uuid,
    contributor_name: String,
    contributor_email: String,
    amount: f64,
    created_at: DateTime<Utc>,
}

impl From<FundRow> for Fund {
    fn from(row: FundRow) -> Self {
        Fund {
            id: row.id,
            contributor_id: row.contributor_id,
            contributor_name: row.contributor_name,
            contributor_email: row.contributor_email,
            amount: row.amount,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl FundRepository for PostgresFundRepository {
    #[tracing::instrument(name = "Saving new fund", skip(self, fund), fields(fund_id = %fund.id))]
    async fn insert_fund(&self, fund: &Fund) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO funds (id, contributor_id, contributor_name, contributor_email, amount,
                created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(fund.id)
        .bind(fund.contributor_id)
        .bind(&fund.contributor_name)
        .bind(&fund.contributor_email)
        .bind(fund.amount)
        .bind(fund.created_at)
        .execute(&self.pool);
        bounded(self.timeout, "Failed to insert fund", query).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Listing funds", skip(self))]
    async fn list_funds(&self) -> Result<Vec<Fund>, StoreError> {
        let query = sqlx::query_as::<_, FundRow>(
            r#"
            SELECT id, contributor_id, contributor_name, contributor_email, amount, created_at
            FROM funds
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool);
        let rows = bounded(self.timeout, "Failed to list funds", query).await?;
        Ok(rows.into_iter().map(Fund::from).collect())
    }

    #[tracing::instrument(name = "Summing funds", skip(self))]
    async fn total_amount(&self) -> Result<f64, StoreError> {
        let query = sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(amount), 0::float8) FROM funds")
            .fetch_one(&self.pool);
        bounded(self.timeout, "Failed to sum funds", query).await
    }
}
