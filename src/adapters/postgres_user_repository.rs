use crate::adapters::{bounded, count_from_row};
use crate::domains::{
    BloodGroup, Role, StoreError, User, UserEmail, UserFilter, UserRepository, UserStatus,
};
use crate::utils::like_pattern;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, external_id, name, avatar, blood_group, \
     district, sub_district, role, status, created_at";

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    external_id: Option<String>,
    name: String,
    avatar: Option<String>,
    blood_group: Option<String>,
    district: Option<String>,
    sub_district: Option<String>,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: String| StoreError::UnexpectedError(anyhow!("Stored user {}: {}", id, e));
        Ok(User {
            id,
            email: UserEmail::parse(row.email).map_err(corrupt)?,
            password_hash: row.password_hash.map(Secret::new),
            external_id: row.external_id,
            name: row.name,
            avatar: row.avatar,
            blood_group: row
                .blood_group
                .map(BloodGroup::try_from)
                .transpose()
                .map_err(corrupt)?,
            district: row.district,
            sub_district: row.sub_district,
            role: Role::try_from(row.role).map_err(corrupt)?,
            status: UserStatus::try_from(row.status).map_err(corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(name = "Saving new user in the database", skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, external_id, name, avatar, blood_group,
                district, sub_district, role, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_ref())
        .bind(user.password_hash.as_ref().map(|hash| hash.expose_secret().as_str()))
        .bind(user.external_id.as_deref())
        .bind(&user.name)
        .bind(user.avatar.as_deref())
        .bind(user.blood_group.map(|group| group.as_str()))
        .bind(user.district.as_deref())
        .bind(user.sub_district.as_deref())
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.created_at)
        .execute(&self.pool);

        bounded(self.timeout, "Failed to insert user", query)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    StoreError::Conflict(format!("{} is already registered", user.email))
                }
                other => other,
            })?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetching user by id", skip(self))]
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool);
        bounded(self.timeout, "Failed to fetch user by id", query)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "Fetching user by email", skip(self, email))]
    async fn get_user_by_email(&self, email: &UserEmail) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_ref())
            .fetch_optional(&self.pool);
        bounded(self.timeout, "Failed to fetch user by email", query)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "Updating user in the database", skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, external_id = $3, name = $4, avatar = $5, blood_group = $6,
                district = $7, sub_district = $8, role = $9, status = $10
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(user.password_hash.as_ref().map(|hash| hash.expose_secret().as_str()))
        .bind(user.external_id.as_deref())
        .bind(&user.name)
        .bind(user.avatar.as_deref())
        .bind(user.blood_group.map(|group| group.as_str()))
        .bind(user.district.as_deref())
        .bind(user.sub_district.as_deref())
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .execute(&self.pool);
        bounded(self.timeout, "Failed to update user", query).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Listing users", skip(self))]
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR blood_group = $2)
              AND ($3::text IS NULL OR district ILIKE $3)
              AND ($4::text IS NULL OR sub_district ILIKE $4)
            ORDER BY created_at DESC, id
            "#,
            USER_COLUMNS
        );
        let query = sqlx::query_as::<_, UserRow>(&sql)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.blood_group.map(|group| group.as_str()))
            .bind(filter.district.as_deref().map(like_pattern))
            .bind(filter.sub_district.as_deref().map(like_pattern))
            .fetch_all(&self.pool);
        bounded(self.timeout, "Failed to list users", query)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    #[tracing::instrument(name = "Counting users", skip(self))]
    async fn count_users(&self) -> Result<u64, StoreError> {
        let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool);
        count_from_row(bounded(self.timeout, "Failed to count users", query).await?)
    }
}
