use crate::domains::{BloodGroup, UserFilter, UserProfile, UserRepository, UserStatus};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSearchQuery {
    blood_group: Option<BloodGroup>,
    district: Option<String>,
    sub_district: Option<String>,
}

/// Blocked accounts never appear in search results.
#[tracing::instrument(name = "Searching donors", skip(users))]
pub async fn search_donors(
    query: web::Query<DonorSearchQuery>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    let DonorSearchQuery {
        blood_group,
        district,
        sub_district,
    } = query.into_inner();
    let filter = UserFilter {
        status: Some(UserStatus::Active),
        blood_group,
        district: district.filter(|d| !d.trim().is_empty()),
        sub_district: sub_district.filter(|d| !d.trim().is_empty()),
    };
    let donors: Vec<UserProfile> = users
        .list_users(&filter)
        .await
        .context("Failed to search donors")?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(HttpResponse::Ok().json(donors))
}
