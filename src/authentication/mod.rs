mod middleware;
mod password;
mod token;

pub use middleware::{
    authenticate, bearer_token, ensure_admin, reject_anonymous_users, reject_non_admin_users,
    AuthenticatedUser,
};
pub use password::{hash_password, validate_credentials, AuthError, Credentials};
pub use token::{Claims, TokenError, TokenService};
