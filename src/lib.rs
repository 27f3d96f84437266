pub mod auth;
pub mod configuration;
pub mod database;
pub mod errors;
pub mod images;
pub mod model;
pub mod observability;
pub mod rate_limiting;
pub mod routes;
pub mod startup;
pub mod store;
