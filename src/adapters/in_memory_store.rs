use crate::domains::{
    DonationRequest, DonationRequestFilter, DonationRequestRepository, DonationStatus, Donor,
    Fund, FundRepository, Page, PageRequest, StoreError, User, UserEmail, UserFilter,
    UserRepository,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store used for local runs and tests.
///
/// Records are kept in insertion order so listings with equal timestamps
/// still come out newest first.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    donation_requests: RwLock<Vec<DonationRequest>>,
    funds: RwLock<Vec<Fund>>,
}

fn newest_first<T: Clone>(records: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut sorted: Vec<T> = records.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    sorted
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "{} is already registered",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &UserEmail) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| &user.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|existing| existing.id == user.id)
            .ok_or_else(|| anyhow!("User {} does not exist", user.id))?;
        *stored = user.clone();
        Ok(())
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(newest_first(&users, |user| user.created_at)
            .into_iter()
            .filter(|user| filter.matches(user))
            .collect())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[async_trait]
impl DonationRequestRepository for InMemoryStore {
    async fn insert_request(&self, request: &DonationRequest) -> Result<(), StoreError> {
        self.donation_requests.write().await.push(request.clone());
        Ok(())
    }

    async fn get_request(&self, request_id: Uuid) -> Result<Option<DonationRequest>, StoreError> {
        let requests = self.donation_requests.read().await;
        Ok(requests.iter().find(|request| request.id == request_id).cloned())
    }

    async fn update_request(
        &self,
        request: &DonationRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut requests = self.donation_requests.write().await;
        let Some(stored) = requests.iter_mut().find(|existing| existing.id == request.id) else {
            return Ok(false);
        };
        if stored.updated_at != expected_updated_at {
            return Ok(false);
        }
        let donor = stored.donor.take();
        *stored = request.clone();
        stored.donor = donor;
        Ok(true)
    }

    async fn delete_request(&self, request_id: Uuid) -> Result<bool, StoreError> {
        let mut requests = self.donation_requests.write().await;
        let before = requests.len();
        requests.retain(|request| request.id != request_id);
        Ok(requests.len() < before)
    }

    async fn list_requests(
        &self,
        filter: &DonationRequestFilter,
    ) -> Result<Vec<DonationRequest>, StoreError> {
        let requests = self.donation_requests.read().await;
        Ok(newest_first(&requests, |request| request.created_at)
            .into_iter()
            .filter(|request| filter.matches(request))
            .collect())
    }

    async fn list_requests_by_requester(
        &self,
        requester_id: Uuid,
        status: Option<DonationStatus>,
        page: PageRequest,
    ) -> Result<Page<DonationRequest>, StoreError> {
        let requests = self.donation_requests.read().await;
        let owned: Vec<DonationRequest> = newest_first(&requests, |request| request.created_at)
            .into_iter()
            .filter(|request| request.requester_id == requester_id)
            .filter(|request| status.map_or(true, |status| status == request.status))
            .collect();
        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page { items, total })
    }

    async fn assign_donor(
        &self,
        request_id: Uuid,
        donor: &Donor,
    ) -> Result<Option<DonationRequest>, StoreError> {
        let mut requests = self.donation_requests.write().await;
        let Some(request) = requests.iter_mut().find(|request| request.id == request_id) else {
            return Ok(None);
        };
        match request.assign_donor(donor.clone()) {
            Ok(()) => Ok(Some(request.clone())),
            Err(_) => Ok(None),
        }
    }

    async fn count_requests(&self) -> Result<u64, StoreError> {
        Ok(self.donation_requests.read().await.len() as u64)
    }
}

#[async_trait]
impl FundRepository for InMemoryStore {
    async fn insert_fund(&self, fund: &Fund) -> Result<(), StoreError> {
        self.funds.write().await.push(fund.clone());
        Ok(())
    }

    async fn list_funds(&self) -> Result<Vec<Fund>, StoreError> {
        let funds = self.funds.read().await;
        Ok(newest_first(&funds, |fund| fund.created_at))
    }

    async fn total_amount(&self) -> Result<f64, StoreError> {
        let funds = self.funds.read().await;
        Ok(funds.iter().fold(0.0, |total, fund| total + fund.amount))
    }
}
