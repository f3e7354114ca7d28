use crate::adapters::{bounded, count_from_row};
use crate::domains::{
    BloodGroup, DonationRequest, DonationRequestFilter, DonationRequestRepository,
    DonationStatus, Donor, Page, PageRequest, StoreError,
};
use crate::utils::like_pattern;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_COLUMNS: &str = "id, requester_id, requester_name, requester_email, \
     recipient_name, recipient_district, recipient_sub_district, hospital_name, full_address, \
     blood_group, donation_date, donation_time, message, status, donor_id, donor_name, \
     donor_email, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresDonationRequestRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresDonationRequestRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(sqlx::FromRow)]
struct DonationRequestRow {
    id: Uuid,
    requester_id: Uuid,
    requester_name: String,
    requester_email: String,
    recipient_name: String,
    recipient_district: String,
    recipient_sub_district: String,
    hospital_name: String,
    full_address: String,
    blood_group: String,
    donation_date: NaiveDate,
    donation_time: NaiveTime,
    message: Option<String>,
    status: String,
    donor_id: Option<Uuid>,
    donor_name: Option<String>,
    donor_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DonationRequestRow> for DonationRequest {
    type Error = StoreError;

    fn try_from(row: DonationRequestRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: String| {
            StoreError::UnexpectedError(anyhow!("Stored donation request {}: {}", id, e))
        };
        let donor = match (row.donor_id, row.donor_name, row.donor_email) {
            (Some(id), Some(name), Some(email)) => Some(Donor { id, name, email }),
            _ => None,
        };
        Ok(DonationRequest {
            id,
            requester_id: row.requester_id,
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            recipient_name: row.recipient_name,
            recipient_district: row.recipient_district,
            recipient_sub_district: row.recipient_sub_district,
            hospital_name: row.hospital_name,
            full_address: row.full_address,
            blood_group: BloodGroup::try_from(row.blood_group).map_err(corrupt)?,
            donation_date: row.donation_date,
            donation_time: row.donation_time,
            message: row.message,
            status: DonationStatus::try_from(row.status).map_err(corrupt)?,
            donor,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_requests(rows: Vec<DonationRequestRow>) -> Result<Vec<DonationRequest>, StoreError> {
    rows.into_iter().map(DonationRequest::try_from).collect()
}

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|e| StoreError::UnexpectedError(anyhow::Error::new(e)))
}

#[async_trait]
impl DonationRequestRepository for PostgresDonationRequestRepository {
    #[tracing::instrument(name = "Saving new donation request", skip(self, request), fields(request_id = %request.id))]
    async fn insert_request(&self, request: &DonationRequest) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO donation_requests (id, requester_id, requester_name, requester_email,
                recipient_name, recipient_district, recipient_sub_district, hospital_name,
                full_address, blood_group, donation_date, donation_time, message, status,
                donor_id, donor_name, donor_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19)
            "#,
        )
        .bind(request.id)
        .bind(request.requester_id)
        .bind(&request.requester_name)
        .bind(&request.requester_email)
        .bind(&request.recipient_name)
        .bind(&request.recipient_district)
        .bind(&request.recipient_sub_district)
        .bind(&request.hospital_name)
        .bind(&request.full_address)
        .bind(request.blood_group.as_str())
        .bind(request.donation_date)
        .bind(request.donation_time)
        .bind(request.message.as_deref())
        .bind(request.status.as_str())
        .bind(request.donor.as_ref().map(|donor| donor.id))
        .bind(request.donor.as_ref().map(|donor| donor.name.as_str()))
        .bind(request.donor.as_ref().map(|donor| donor.email.as_str()))
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool);
        bounded(self.timeout, "Failed to insert donation request", query).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetching donation request", skip(self))]
    async fn get_request(&self, request_id: Uuid) -> Result<Option<DonationRequest>, StoreError> {
        let sql = format!("SELECT {} FROM donation_requests WHERE id = $1", REQUEST_COLUMNS);
        let query = sqlx::query_as::<_, DonationRequestRow>(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool);
        bounded(self.timeout, "Failed to fetch donation request", query)
            .await?
            .map(DonationRequest::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "Updating donation request", skip(self, request), fields(request_id = %request.id))]
    async fn update_request(
        &self,
        request: &DonationRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE donation_requests
            SET recipient_name = $2, recipient_district = $3, recipient_sub_district = $4,
                hospital_name = $5, full_address = $6, blood_group = $7, donation_date = $8,
                donation_time = $9, message = $10, status = $11, updated_at = $12
            WHERE id = $1 AND updated_at = $13
            "#,
        )
        .bind(request.id)
        .bind(&request.recipient_name)
        .bind(&request.recipient_district)
        .bind(&request.recipient_sub_district)
        .bind(&request.hospital_name)
        .bind(&request.full_address)
        .bind(request.blood_group.as_str())
        .bind(request.donation_date)
        .bind(request.donation_time)
        .bind(request.message.as_deref())
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .bind(expected_updated_at)
        .execute(&self.pool);
        let result = bounded(self.timeout, "Failed to update donation request", query).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Deleting donation request", skip(self))]
    async fn delete_request(&self, request_id: Uuid) -> Result<bool, StoreError> {
        let query = sqlx::query("DELETE FROM donation_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool);
        let result = bounded(self.timeout, "Failed to delete donation request", query).await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Listing donation requests", skip(self))]
    async fn list_requests(
        &self,
        filter: &DonationRequestFilter,
    ) -> Result<Vec<DonationRequest>, StoreError> {
        let sql = format!(
            r#"
            SELECT {} FROM donation_requests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR blood_group = $2)
              AND ($3::text IS NULL OR recipient_district ILIKE $3)
            ORDER BY created_at DESC, id
            "#,
            REQUEST_COLUMNS
        );
        let query = sqlx::query_as::<_, DonationRequestRow>(&sql)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.blood_group.map(|group| group.as_str()))
            .bind(filter.district.as_deref().map(like_pattern))
            .fetch_all(&self.pool);
        into_requests(bounded(self.timeout, "Failed to list donation requests", query).await?)
    }

    #[tracing::instrument(name = "Listing a requester's donation requests", skip(self))]
    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
        status: Option<DonationStatus>,
        page: PageRequest,
    ) -> Result<Page<DonationRequest>, StoreError> {
        let status = status.map(|status| status.as_str());
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM donation_requests
            WHERE requester_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(requester_id)
        .bind(status)
        .fetch_one(&self.pool);
        let total = count_from_row(
            bounded(self.timeout, "Failed to count donation requests", count).await?,
        )?;

        let sql = format!(
            r#"
            SELECT {} FROM donation_requests
            WHERE requester_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#,
            REQUEST_COLUMNS
        );
        let query = sqlx::query_as::<_, DonationRequestRow>(&sql)
            .bind(requester_id)
            .bind(status)
            .bind(to_i64(page.limit())?)
            .bind(to_i64(page.offset())?)
            .fetch_all(&self.pool);
        let items =
            into_requests(bounded(self.timeout, "Failed to page donation requests", query).await?)?;
        Ok(Page { items, total })
    }

    #[tracing::instrument(name = "Assigning donor to donation request", skip(self, donor), fields(donor_id = %donor.id))]
    async fn assign_donor(
        &self,
        request_id: Uuid,
        donor: &Donor,
    ) -> Result<Option<DonationRequest>, StoreError> {
        let sql = format!(
            r#"
            UPDATE donation_requests
            SET status = 'inprogress', donor_id = $2, donor_name = $3, donor_email = $4,
                updated_at = $5
            WHERE id = $1 AND status = 'pending' AND donor_id IS NULL
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let query = sqlx::query_as::<_, DonationRequestRow>(&sql)
            .bind(request_id)
            .bind(donor.id)
            .bind(&donor.name)
            .bind(&donor.email)
            .bind(Utc::now())
            .fetch_optional(&self.pool);
        bounded(self.timeout, "Failed to assign donor", query)
            .await?
            .map(DonationRequest::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "Counting donation requests", skip(self))]
    async fn count_requests(&self) -> Result<u64, StoreError> {
        let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donation_requests")
            .fetch_one(&self.pool);
        count_from_row(bounded(self.timeout, "Failed to count donation requests", query).await?)
    }
}
