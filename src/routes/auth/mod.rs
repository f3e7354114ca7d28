mod google_login;
mod login;
mod register;

pub use google_login::google_login;
pub use login::login;
pub use register::register;

use crate::authentication::TokenService;
use crate::domains::{User, UserEmail, UserName, UserProfile};
use crate::routes::ApiError;
use actix_web::web;
use anyhow::Context;

/// Body returned by every sign-in flavour.
#[derive(serde::Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

impl AuthResponse {
    fn issue(tokens: &TokenService, user: &User) -> Result<Self, ApiError> {
        let token = tokens
            .issue(user.id)
            .context("Failed to issue an access token")?;
        Ok(Self {
            token,
            user: UserProfile::from(user),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/google-login", web::post().to(google_login)),
    );
}

/// A blank or missing display name falls back to the email's local part.
fn name_or_email_local_part(name: Option<String>, email: &UserEmail) -> Result<UserName, String> {
    match name.filter(|name| !name.trim().is_empty()) {
        Some(name) => UserName::parse(name),
        None => {
            let local_part = email
                .as_ref()
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string();
            UserName::parse(local_part)
        }
    }
}
