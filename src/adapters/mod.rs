mod in_memory_store;
mod postgres_donation_request_repository;
mod postgres_fund_repository;
mod postgres_user_repository;

pub use in_memory_store::InMemoryStore;
pub use postgres_donation_request_repository::PostgresDonationRequestRepository;
pub use postgres_fund_repository::PostgresFundRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domains::{DonationRequestRepository, FundRepository, StoreError, UserRepository};
use anyhow::anyhow;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The store handles shared by every request.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub donation_requests: Arc<dyn DonationRequestRepository>,
    pub funds: Arc<dyn FundRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool, timeout: Duration) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone(), timeout)),
            donation_requests: Arc::new(PostgresDonationRequestRepository::new(
                pool.clone(),
                timeout,
            )),
            funds: Arc::new(PostgresFundRepository::new(pool, timeout)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            users: store.clone(),
            donation_requests: store.clone(),
            funds: store,
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

/// Runs a query under the configured deadline. Writes are never retried.
async fn bounded<T, F>(timeout: Duration, operation: &'static str, query: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_sqlx_error(e, operation)),
        Err(_) => Err(StoreError::UnexpectedError(anyhow!(
            "{} timed out after {}ms",
            operation,
            timeout.as_millis()
        ))),
    }
}

fn map_sqlx_error(e: sqlx::Error, operation: &'static str) -> StoreError {
    let is_unique_violation = e
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .map_or(false, |code| code == UNIQUE_VIOLATION);
    if is_unique_violation {
        StoreError::Conflict(format!("{} violated a unique constraint", operation))
    } else {
        StoreError::UnexpectedError(anyhow::Error::new(e).context(operation))
    }
}

fn count_from_row(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count)
        .map_err(|e| StoreError::UnexpectedError(anyhow!("Negative row count {}: {}", count, e)))
}
