use crate::domains::StoreError;
use crate::utils::error_chain_fmt;
use actix_web::{
    dev::ServiceResponse,
    http::StatusCode,
    middleware::ErrorHandlerResponse,
    HttpResponse, ResponseError,
};

/// Every failure a handler can report. Each maps to one status code and a
/// `{"message": ...}` body.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized access")]
    Unauthenticated(#[source] anyhow::Error),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_)
            | ApiError::InvalidCredentials(_)
            | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
            stack: None,
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::UnexpectedError(e) => ApiError::UnexpectedError(e),
        }
    }
}

/// Rewrites 500 bodies to carry the full error chain. Only mounted outside
/// production.
pub fn add_error_chain<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let body = match res.response().error() {
        Some(e) => ErrorBody {
            message: e.to_string(),
            stack: Some(format!("{:?}", e)),
        },
        None => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };
    let (req, res) = res.into_parts();
    let res = HttpResponse::build(res.status()).json(body);
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("Route not found".to_string()))
}
