use super::{name_or_email_local_part, AuthResponse};
use crate::authentication::TokenService;
use crate::domains::{StoreError, User, UserEmail, UserRepository};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;

/// Identity already verified by the external provider.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FederatedIdentity {
    email: String,
    display_name: Option<String>,
    external_id: String,
    avatar: Option<String>,
}

/// Finds or creates the account for a federated identity, then signs it in.
/// Repeating the call with the same identity is harmless.
#[tracing::instrument(
    name = "Federated login",
    skip(identity, users, tokens),
    fields(email = %identity.email, user_id = tracing::field::Empty)
)]
pub async fn google_login(
    identity: web::Json<FederatedIdentity>,
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, ApiError> {
    let identity = identity.into_inner();
    let email = UserEmail::parse(identity.email).map_err(ApiError::ValidationError)?;
    let external_id = identity.external_id.trim().to_string();
    if external_id.is_empty() {
        return Err(ApiError::ValidationError(
            "externalId must not be empty".to_string(),
        ));
    }

    let existing = users
        .get_user_by_email(&email)
        .await
        .context("Failed to look up the federated account")?;

    let user = match existing {
        Some(mut user) => {
            if user.external_id.is_none() {
                user.external_id = Some(external_id);
                if user.avatar.is_none() {
                    user.avatar = identity.avatar;
                }
                users
                    .update_user(&user)
                    .await
                    .context("Failed to link the federated identity")?;
            }
            user
        }
        None => {
            let name = name_or_email_local_part(identity.display_name, &email)
                .map_err(ApiError::ValidationError)?;
            let mut user = User::new(email.clone(), name.as_ref().to_owned());
            user.external_id = Some(external_id);
            user.avatar = identity.avatar;
            match users.insert_user(&user).await {
                Ok(()) => user,
                // Lost a race with a concurrent first login for the same email.
                Err(StoreError::Conflict(_)) => users
                    .get_user_by_email(&email)
                    .await
                    .context("Failed to reload the federated account")?
                    .context("Federated account vanished after a conflicting insert")?,
                Err(e) => return Err(e.into()),
            }
        }
    };
    tracing::Span::current().record("user_id", &tracing::field::display(&user.id));

    Ok(HttpResponse::Ok().json(AuthResponse::issue(&tokens, &user)?))
}
