use crate::domains::{Fund, StoreError};
use async_trait::async_trait;

#[async_trait]
pub trait FundRepository: Send + Sync {
    async fn insert_fund(&self, fund: &Fund) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_funds(&self) -> Result<Vec<Fund>, StoreError>;

    /// Sum of every contribution ever recorded.
    async fn total_amount(&self) -> Result<f64, StoreError>;
}
