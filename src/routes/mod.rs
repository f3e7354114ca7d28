mod auth;
mod dashboard;
mod donation_requests;
mod donors;
mod error;
mod funds;
mod health_check;
mod users;

pub use auth::{google_login, login, register, AuthResponse};
pub use dashboard::{dashboard_stats, DashboardStats};
pub use donation_requests::{
    create_request, delete_request, donate, get_request, list_requests, my_requests,
    update_request,
};
pub use donors::search_donors;
pub use error::{add_error_chain, not_found, ApiError};
pub use funds::{contribute, list_funds};
pub use health_check::*;
pub use users::{change_role, change_status, current_user, list_users, update_profile};

use crate::authentication::reject_anonymous_users;
use actix_web::web;
use actix_web_lab::middleware::from_fn;

/// Everything under `/api`.
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::configure)
            .service(
                web::scope("/dashboard")
                    .wrap(from_fn(reject_anonymous_users))
                    .route("/stats", web::get().to(dashboard_stats)),
            )
            .service(
                web::scope("/users")
                    .wrap(from_fn(reject_anonymous_users))
                    .configure(users::configure),
            )
            .service(web::scope("/donation-requests").configure(donation_requests::configure))
            .service(
                web::scope("/funds")
                    .wrap(from_fn(reject_anonymous_users))
                    .route("", web::get().to(list_funds))
                    .route("", web::post().to(contribute)),
            )
            .route("/donors/search", web::get().to(search_donors)),
    );
}
