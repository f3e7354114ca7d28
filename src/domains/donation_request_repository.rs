use crate::domains::{
    DonationRequest, DonationRequestFilter, DonationStatus, Donor, Page, PageRequest, StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait DonationRequestRepository: Send + Sync {
    async fn insert_request(&self, request: &DonationRequest) -> Result<(), StoreError>;

    async fn get_request(&self, request_id: Uuid) -> Result<Option<DonationRequest>, StoreError>;

    /// Writes the editable fields and the status, never the donor. The write
    /// only lands while the stored `updated_at` still equals
    /// `expected_updated_at`; returns `false` when the record changed or
    /// vanished since it was read.
    async fn update_request(
        &self,
        request: &DonationRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_request(&self, request_id: Uuid) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list_requests(
        &self,
        filter: &DonationRequestFilter,
    ) -> Result<Vec<DonationRequest>, StoreError>;

    /// One page of a requester's own requests, newest first.
    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
        status: Option<DonationStatus>,
        page: PageRequest,
    ) -> Result<Page<DonationRequest>, StoreError>;

    /// Attaches the donor and moves the request to `inprogress` in a single
    /// conditional write. Returns `None` when the request is missing or no
    /// longer pending.
    async fn assign_donor(
        &self,
        request_id: Uuid,
        donor: &Donor,
    ) -> Result<Option<DonationRequest>, StoreError>;

    async fn count_requests(&self) -> Result<u64, StoreError>;
}
