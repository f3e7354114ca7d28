use crate::domains::UserProfile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundAmount(f64);

impl FundAmount {
    pub fn parse(amount: f64) -> Result<FundAmount, String> {
        if amount.is_finite() && amount > 0.0 {
            Ok(Self(amount))
        } else {
            Err(format!("{} is not a valid contribution amount", amount))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: Uuid,
    pub contributor_id: Uuid,
    pub contributor_name: String,
    pub contributor_email: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Fund {
    pub fn new(contributor: &UserProfile, amount: FundAmount) -> Self {
        Self {
            id: Uuid::new_v4(),
            contributor_id: contributor.id,
            contributor_name: contributor.name.clone(),
            contributor_email: contributor.email.clone(),
            amount: amount.value(),
            created_at: Utc::now(),
        }
    }
}
