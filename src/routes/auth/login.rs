use super::AuthResponse;
use crate::authentication::{validate_credentials, AuthError, Credentials, TokenService};
use crate::domains::{UserEmail, UserRepository};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::anyhow;
use secrecy::Secret;

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginBody {
    email: String,
    password: Secret<String>,
}

#[tracing::instrument(
    name = "Logging in",
    skip(body, users, tokens),
    fields(email = %body.email, user_id = tracing::field::Empty)
)]
pub async fn login(
    body: web::Json<LoginBody>,
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, ApiError> {
    let LoginBody { email, password } = body.into_inner();
    // A syntactically invalid email can never match an account.
    let email = UserEmail::parse(email)
        .map_err(|e| ApiError::InvalidCredentials(anyhow!(e)))?;

    let user = validate_credentials(Credentials { email, password }, users.get_ref())
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials(_) => ApiError::InvalidCredentials(e.into()),
            AuthError::UnexpectedError(e) => ApiError::UnexpectedError(e),
        })?;
    tracing::Span::current().record("user_id", &tracing::field::display(&user.id));

    Ok(HttpResponse::Ok().json(AuthResponse::issue(&tokens, &user)?))
}
