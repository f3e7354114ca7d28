pub mod adapters;
pub mod authentication;
pub mod configuration;
pub mod domains;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
