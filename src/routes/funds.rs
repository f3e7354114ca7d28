use crate::authentication::AuthenticatedUser;
use crate::domains::{Fund, FundAmount, FundRepository};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionBody {
    amount: f64,
}

#[tracing::instrument(name = "Listing funds", skip(funds))]
pub async fn list_funds(funds: web::Data<dyn FundRepository>) -> Result<HttpResponse, ApiError> {
    let contributions = funds.list_funds().await.context("Failed to list funds")?;
    Ok(HttpResponse::Ok().json(contributions))
}

#[tracing::instrument(
    name = "Recording a contribution",
    skip(body, caller, funds),
    fields(caller_id = %caller.id, amount = body.amount)
)]
pub async fn contribute(
    body: web::Json<ContributionBody>,
    caller: web::ReqData<AuthenticatedUser>,
    funds: web::Data<dyn FundRepository>,
) -> Result<HttpResponse, ApiError> {
    let amount = FundAmount::parse(body.amount).map_err(ApiError::ValidationError)?;
    let fund = Fund::new(&caller, amount);
    funds
        .insert_fund(&fund)
        .await
        .context("Failed to record the contribution")?;
    Ok(HttpResponse::Created().json(fund))
}
