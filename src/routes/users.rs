use crate::authentication::{reject_non_admin_users, AuthenticatedUser};
use crate::domains::{
    BloodGroup, ProfileUpdate, Role, User, UserFilter, UserName, UserProfile, UserRepository,
    UserStatus,
};
use crate::routes::ApiError;
use actix_web::{web, HttpResponse};
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use uuid::Uuid;

/// Mounted under the authenticated `/users` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(current_user))
        .service(
            web::resource("")
                .wrap(from_fn(reject_non_admin_users))
                .route(web::get().to(list_users)),
        )
        .service(
            web::resource("/{user_id}/status")
                .wrap(from_fn(reject_non_admin_users))
                .route(web::patch().to(change_status)),
        )
        .service(
            web::resource("/{user_id}/role")
                .wrap(from_fn(reject_non_admin_users))
                .route(web::patch().to(change_role)),
        )
        .route("/{user_id}", web::put().to(update_profile));
}

#[derive(Debug, serde::Deserialize)]
pub struct ListUsersQuery {
    status: Option<UserStatus>,
}

#[tracing::instrument(name = "Listing users", skip(users))]
pub async fn list_users(
    query: web::Query<ListUsersQuery>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    let filter = UserFilter {
        status: query.status,
        ..Default::default()
    };
    let profiles: Vec<UserProfile> = users
        .list_users(&filter)
        .await
        .context("Failed to list users")?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn current_user(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(user.into_inner().into_inner())
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusBody {
    status: UserStatus,
}

#[tracing::instrument(name = "Changing user status", skip(body, users), fields(status = body.status.as_str()))]
pub async fn change_status(
    user_id: web::Path<Uuid>,
    body: web::Json<StatusBody>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    let mut user = find_user(users.get_ref(), *user_id).await?;
    user.status = body.status;
    users
        .update_user(&user)
        .await
        .context("Failed to store the new status")?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleBody {
    role: Role,
}

#[tracing::instrument(name = "Changing user role", skip(body, users), fields(role = body.role.as_str()))]
pub async fn change_role(
    user_id: web::Path<Uuid>,
    body: web::Json<RoleBody>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    let mut user = find_user(users.get_ref(), *user_id).await?;
    user.role = body.role;
    users
        .update_user(&user)
        .await
        .context("Failed to store the new role")?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileBody {
    name: Option<String>,
    avatar: Option<String>,
    blood_group: Option<BloodGroup>,
    district: Option<String>,
    sub_district: Option<String>,
}

impl TryFrom<ProfileBody> for ProfileUpdate {
    type Error = String;

    fn try_from(body: ProfileBody) -> Result<Self, Self::Error> {
        Ok(ProfileUpdate {
            name: body.name.map(UserName::parse).transpose()?,
            avatar: body.avatar,
            blood_group: body.blood_group,
            district: body.district,
            sub_district: body.sub_district,
        })
    }
}

/// Users edit their own profile; admins may edit anyone's.
#[tracing::instrument(
    name = "Updating a profile",
    skip(body, users, caller),
    fields(caller_id = %caller.id)
)]
pub async fn update_profile(
    user_id: web::Path<Uuid>,
    body: web::Json<ProfileBody>,
    caller: web::ReqData<AuthenticatedUser>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_id.into_inner();
    if caller.id != user_id && caller.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }
    let update: ProfileUpdate = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;

    let mut user = find_user(users.get_ref(), user_id).await?;
    update.apply(&mut user);
    users
        .update_user(&user)
        .await
        .context("Failed to store the updated profile")?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

async fn find_user(users: &dyn UserRepository, user_id: Uuid) -> Result<User, ApiError> {
    users
        .get_user_by_id(user_id)
        .await
        .context("Failed to load the user")?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
