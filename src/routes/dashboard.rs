use crate::domains::{DonationRequestRepository, FundRepository, UserRepository};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_requests: u64,
    pub total_funds: f64,
}

#[tracing::instrument(name = "Collecting dashboard stats", skip_all)]
pub async fn dashboard_stats(
    users: web::Data<dyn UserRepository>,
    requests: web::Data<dyn DonationRequestRepository>,
    funds: web::Data<dyn FundRepository>,
) -> Result<HttpResponse, ApiError> {
    let (total_users, total_requests, total_funds) = tokio::try_join!(
        users.count_users(),
        requests.count_requests(),
        funds.total_amount(),
    )
    .context("Failed to collect dashboard stats")?;

    Ok(HttpResponse::Ok().json(DashboardStats {
        total_users,
        total_requests,
        total_funds,
    }))
}
