mod auth;
mod dashboard;
mod donation_requests;
mod donors;
mod funds;
