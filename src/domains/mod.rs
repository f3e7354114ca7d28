mod blood_group;
mod donation_request;
mod donation_request_repository;
mod fund;
mod fund_repository;
mod pagination;
mod store_error;
mod user;
mod user_email;
mod user_name;
mod user_repository;

pub use blood_group::BloodGroup;
pub use donation_request::{
    DonationDetails, DonationRequest, DonationRequestFilter, DonationRequestUpdate,
    DonationStatus, Donor,
};
pub use donation_request_repository::DonationRequestRepository;
pub use fund::{Fund, FundAmount};
pub use fund_repository::FundRepository;
pub use pagination::{total_pages, Page, PageRequest, PaginatedRequests, PAGE_SIZE};
pub use store_error::StoreError;
pub use user::{ProfileUpdate, Role, User, UserFilter, UserProfile, UserStatus};
pub use user_email::UserEmail;
pub use user_name::UserName;
pub use user_repository::UserRepository;
