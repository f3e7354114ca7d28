use crate::domains::{StoreError, User, UserEmail, UserFilter};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_user_by_email(&self, email: &UserEmail) -> Result<Option<User>, StoreError>;

    /// Overwrites every mutable field of an existing user.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    /// Newest accounts first.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;
}
