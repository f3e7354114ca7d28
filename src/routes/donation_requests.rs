use crate::authentication::{reject_anonymous_users, AuthenticatedUser};
use crate::domains::{
    BloodGroup, DonationDetails, DonationRequest, DonationRequestFilter,
    DonationRequestRepository, DonationRequestUpdate, DonationStatus, Donor, PageRequest,
    PaginatedRequests, UserName,
};
use crate::routes::ApiError;
use actix_web::{guard, web, HttpResponse};
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

/// Reads are public; every write goes through the authentication middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/my")
            .wrap(from_fn(reject_anonymous_users))
            .route(web::get().to(my_requests)),
    )
    .service(
        web::resource("")
            .guard(guard::Post())
            .wrap(from_fn(reject_anonymous_users))
            .route(web::post().to(create_request)),
    )
    .route("", web::get().to(list_requests))
    .service(
        web::resource("/{request_id}/donate")
            .wrap(from_fn(reject_anonymous_users))
            .route(web::post().to(donate)),
    )
    .service(
        web::resource("/{request_id}")
            .guard(guard::Any(guard::Put()).or(guard::Delete()))
            .wrap(from_fn(reject_anonymous_users))
            .route(web::put().to(update_request))
            .route(web::delete().to(delete_request)),
    )
    .route("/{request_id}", web::get().to(get_request));
}

/// Accepts `HH:MM` as well as `HH:MM:SS`.
fn parse_donation_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("{} is not a valid donation time", value))
}

fn required(field: &str, value: String) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRequestBody {
    recipient_name: String,
    recipient_district: String,
    recipient_sub_district: String,
    hospital_name: String,
    full_address: String,
    blood_group: BloodGroup,
    donation_date: NaiveDate,
    donation_time: String,
    message: Option<String>,
}

impl TryFrom<NewRequestBody> for DonationDetails {
    type Error = String;

    fn try_from(body: NewRequestBody) -> Result<Self, Self::Error> {
        Ok(DonationDetails {
            recipient_name: UserName::parse(body.recipient_name)?,
            recipient_district: required("recipientDistrict", body.recipient_district)?,
            recipient_sub_district: required("recipientSubDistrict", body.recipient_sub_district)?,
            hospital_name: required("hospitalName", body.hospital_name)?,
            full_address: required("fullAddress", body.full_address)?,
            blood_group: body.blood_group,
            donation_date: body.donation_date,
            donation_time: parse_donation_time(&body.donation_time)?,
            message: body.message,
        })
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestUpdateBody {
    recipient_name: Option<String>,
    recipient_district: Option<String>,
    recipient_sub_district: Option<String>,
    hospital_name: Option<String>,
    full_address: Option<String>,
    blood_group: Option<BloodGroup>,
    donation_date: Option<NaiveDate>,
    donation_time: Option<String>,
    message: Option<String>,
    status: Option<DonationStatus>,
}

impl TryFrom<RequestUpdateBody> for DonationRequestUpdate {
    type Error = String;

    fn try_from(body: RequestUpdateBody) -> Result<Self, Self::Error> {
        Ok(DonationRequestUpdate {
            recipient_name: body.recipient_name.map(UserName::parse).transpose()?,
            recipient_district: body
                .recipient_district
                .map(|v| required("recipientDistrict", v))
                .transpose()?,
            recipient_sub_district: body
                .recipient_sub_district
                .map(|v| required("recipientSubDistrict", v))
                .transpose()?,
            hospital_name: body
                .hospital_name
                .map(|v| required("hospitalName", v))
                .transpose()?,
            full_address: body
                .full_address
                .map(|v| required("fullAddress", v))
                .transpose()?,
            blood_group: body.blood_group,
            donation_date: body.donation_date,
            donation_time: body
                .donation_time
                .as_deref()
                .map(parse_donation_time)
                .transpose()?,
            message: body.message,
            status: body.status,
        })
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    status: Option<DonationStatus>,
    blood_group: Option<BloodGroup>,
    district: Option<String>,
}

#[tracing::instrument(name = "Listing donation requests", skip(requests))]
pub async fn list_requests(
    query: web::Query<ListQuery>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let ListQuery {
        status,
        blood_group,
        district,
    } = query.into_inner();
    let filter = DonationRequestFilter {
        status,
        blood_group,
        district: district.filter(|d| !d.trim().is_empty()),
    };
    let found = requests
        .list_requests(&filter)
        .await
        .context("Failed to list donation requests")?;
    Ok(HttpResponse::Ok().json(found))
}

#[derive(Debug, serde::Deserialize)]
pub struct MyRequestsQuery {
    page: Option<u64>,
    status: Option<DonationStatus>,
}

#[tracing::instrument(
    name = "Listing the caller's donation requests",
    skip(requests, caller),
    fields(caller_id = %caller.id)
)]
pub async fn my_requests(
    query: web::Query<MyRequestsQuery>,
    caller: web::ReqData<AuthenticatedUser>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let page = PageRequest::parse(query.page).map_err(ApiError::ValidationError)?;
    let found = requests
        .list_requests_by_requester(caller.id, query.status, page)
        .await
        .context("Failed to list the caller's donation requests")?;
    Ok(HttpResponse::Ok().json(PaginatedRequests {
        total_pages: found.total_pages(),
        current_page: page.number(),
        requests: found.items,
    }))
}

#[tracing::instrument(name = "Fetching a donation request", skip(requests))]
pub async fn get_request(
    request_id: web::Path<Uuid>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let request = find_request(requests.get_ref(), *request_id).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[tracing::instrument(
    name = "Creating a donation request",
    skip(body, caller, requests),
    fields(caller_id = %caller.id, request_id = tracing::field::Empty)
)]
pub async fn create_request(
    body: web::Json<NewRequestBody>,
    caller: web::ReqData<AuthenticatedUser>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let details: DonationDetails = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;
    let request = DonationRequest::new(&caller, details);
    requests
        .insert_request(&request)
        .await
        .context("Failed to store the donation request")?;
    tracing::Span::current().record("request_id", &tracing::field::display(&request.id));
    Ok(HttpResponse::Created().json(request))
}

#[tracing::instrument(
    name = "Updating a donation request",
    skip(body, caller, requests),
    fields(caller_id = %caller.id)
)]
pub async fn update_request(
    request_id: web::Path<Uuid>,
    body: web::Json<RequestUpdateBody>,
    caller: web::ReqData<AuthenticatedUser>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let mut request = find_request(requests.get_ref(), *request_id).await?;
    ensure_manageable(&request, &caller)?;
    let update: DonationRequestUpdate = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;

    let read_at = request.updated_at;
    update
        .apply(&mut request)
        .map_err(ApiError::ValidationError)?;
    let stored = requests
        .update_request(&request, read_at)
        .await
        .context("Failed to store the updated donation request")?;
    if !stored {
        return Err(ApiError::Conflict(
            "Donation request changed while it was being updated".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(request))
}

#[derive(serde::Serialize)]
struct Deleted {
    message: &'static str,
    id: Uuid,
}

#[tracing::instrument(
    name = "Deleting a donation request",
    skip(caller, requests),
    fields(caller_id = %caller.id)
)]
pub async fn delete_request(
    request_id: web::Path<Uuid>,
    caller: web::ReqData<AuthenticatedUser>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let request = find_request(requests.get_ref(), *request_id).await?;
    ensure_manageable(&request, &caller)?;

    let deleted = requests
        .delete_request(request.id)
        .await
        .context("Failed to delete the donation request")?;
    if !deleted {
        return Err(request_not_found());
    }
    Ok(HttpResponse::Ok().json(Deleted {
        message: "Donation request deleted",
        id: request.id,
    }))
}

/// Volunteers the caller as the donor of a pending request.
#[tracing::instrument(
    name = "Donating to a request",
    skip(caller, requests),
    fields(caller_id = %caller.id)
)]
pub async fn donate(
    request_id: web::Path<Uuid>,
    caller: web::ReqData<AuthenticatedUser>,
    requests: web::Data<dyn DonationRequestRepository>,
) -> Result<HttpResponse, ApiError> {
    let request = find_request(requests.get_ref(), *request_id).await?;
    if request.requester_id == caller.id {
        return Err(ApiError::ValidationError(
            "You cannot donate to your own request".to_string(),
        ));
    }
    if !request.accepts_donor() {
        return Err(not_pending());
    }

    let donor = Donor::from(&**caller);
    let updated = requests
        .assign_donor(request.id, &donor)
        .await
        .context("Failed to assign the donor")?
        .ok_or_else(not_pending)?;
    Ok(HttpResponse::Ok().json(updated))
}

fn ensure_manageable(
    request: &DonationRequest,
    caller: &AuthenticatedUser,
) -> Result<(), ApiError> {
    if request.is_managed_by(caller) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the requester or an admin can change this request".to_string(),
        ))
    }
}

async fn find_request(
    requests: &dyn DonationRequestRepository,
    request_id: Uuid,
) -> Result<DonationRequest, ApiError> {
    requests
        .get_request(request_id)
        .await
        .context("Failed to load the donation request")?
        .ok_or_else(request_not_found)
}

fn request_not_found() -> ApiError {
    ApiError::NotFound("Donation request not found".to_string())
}

fn not_pending() -> ApiError {
    ApiError::Conflict("Donation request is not pending".to_string())
}
