use super::{name_or_email_local_part, AuthResponse};
use crate::authentication::{hash_password, TokenService};
use crate::domains::{BloodGroup, StoreError, User, UserEmail, UserRepository};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterBody {
    name: Option<String>,
    email: String,
    password: Secret<String>,
    avatar: Option<String>,
    blood_group: Option<BloodGroup>,
    district: Option<String>,
    sub_district: Option<String>,
}

struct NewUser {
    user: User,
    password: Secret<String>,
}

impl TryFrom<RegisterBody> for NewUser {
    type Error = String;

    fn try_from(body: RegisterBody) -> Result<Self, Self::Error> {
        let email = UserEmail::parse(body.email)?;
        let name = name_or_email_local_part(body.name, &email)?;
        if body.password.expose_secret().is_empty() {
            return Err("password must not be empty".to_string());
        }
        let mut user = User::new(email, name.as_ref().to_owned());
        user.avatar = body.avatar;
        user.blood_group = body.blood_group;
        user.district = body.district;
        user.sub_district = body.sub_district;
        Ok(Self {
            user,
            password: body.password,
        })
    }
}

#[tracing::instrument(
    name = "Registering a new user",
    skip(body, users, tokens),
    fields(email = %body.email, user_id = tracing::field::Empty)
)]
pub async fn register(
    body: web::Json<RegisterBody>,
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, ApiError> {
    let NewUser { mut user, password } = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;

    if users
        .get_user_by_email(&user.email)
        .await
        .context("Failed to check for an existing account")?
        .is_some()
    {
        return Err(user_already_exists());
    }

    user.password_hash = Some(hash_password(password).await?);
    users.insert_user(&user).await.map_err(|e| match e {
        StoreError::Conflict(_) => user_already_exists(),
        other => ApiError::from(other),
    })?;
    tracing::Span::current().record("user_id", &tracing::field::display(&user.id));

    Ok(HttpResponse::Created().json(AuthResponse::issue(&tokens, &user)?))
}

fn user_already_exists() -> ApiError {
    ApiError::Conflict("User already exists".to_string())
}
