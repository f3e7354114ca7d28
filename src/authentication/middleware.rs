use std::ops::Deref;

use crate::authentication::{TokenError, TokenService};
use crate::domains::{Role, UserProfile, UserRepository};
use crate::routes::ApiError;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderMap, AUTHORIZATION},
    web, HttpMessage,
};
use actix_web_lab::middleware::Next;
use anyhow::{anyhow, Context};

/// The caller resolved by [`reject_anonymous_users`], without credentials.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(UserProfile);

impl AuthenticatedUser {
    pub fn into_inner(self) -> UserProfile {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = UserProfile;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, anyhow::Error> {
    let header = headers
        .get(AUTHORIZATION)
        .context("The 'Authorization' header was missing")?
        .to_str()
        .context("The 'Authorization' header was not a valid string")?;

    let token = header
        .strip_prefix("Bearer ")
        .context("The authorization scheme was not 'Bearer'")?
        .trim();

    if token.is_empty() {
        return Err(anyhow!("The bearer token was empty"));
    }
    Ok(token)
}

/// Token to user resolution. Blocked accounts are refused even when the
/// token itself is still valid.
#[tracing::instrument(name = "Authenticating bearer token", skip_all, fields(user_id = tracing::field::Empty))]
pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
    users: &dyn UserRepository,
) -> Result<UserProfile, ApiError> {
    let token = bearer_token(headers).map_err(ApiError::Unauthenticated)?;

    let claims = tokens.verify(token).map_err(|e| match e {
        TokenError::UnexpectedError(e) => ApiError::UnexpectedError(e),
        other => ApiError::Unauthenticated(other.into()),
    })?;
    tracing::Span::current().record("user_id", &tracing::field::display(&claims.sub));

    let user = users
        .get_user_by_id(claims.sub)
        .await
        .context("Failed to load the token's user")?
        .ok_or_else(|| ApiError::Unauthenticated(anyhow!("No user matches the token subject")))?;

    if user.is_blocked() {
        return Err(ApiError::Forbidden("Your account has been blocked".to_string()));
    }
    Ok(UserProfile::from(user))
}

pub async fn reject_anonymous_users(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .cloned()
        .ok_or_else(|| ApiError::UnexpectedError(anyhow!("Token service is not registered")))?;
    let users = req
        .app_data::<web::Data<dyn UserRepository>>()
        .cloned()
        .ok_or_else(|| ApiError::UnexpectedError(anyhow!("User repository is not registered")))?;

    let user = authenticate(req.headers(), &tokens, users.get_ref()).await?;
    req.extensions_mut().insert(AuthenticatedUser(user));
    next.call(req).await
}

pub fn ensure_admin(user: &UserProfile) -> Result<(), ApiError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

/// Must be nested inside [`reject_anonymous_users`].
pub async fn reject_non_admin_users(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let user = req.extensions().get::<AuthenticatedUser>().cloned();
    match user {
        Some(user) => ensure_admin(&user)?,
        None => {
            return Err(ApiError::Unauthenticated(anyhow!(
                "Admin gate reached without an authenticated user"
            ))
            .into())
        }
    }
    next.call(req).await
}
