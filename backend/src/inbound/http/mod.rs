//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod admission_form;
pub mod admissions;
pub mod auth;
pub mod authentication;
pub mod envelope;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use crate::domain::ApiResult;
use crate::domain::Error;

/// Message returned for paths no handler claims.
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Register every API scope together with extractor configuration that
/// renders malformed JSON, query strings and paths as `invalid_request`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::extractor_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::extractor_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::extractor_error_handler))
        .configure(health::configure)
        .configure(admissions::configure)
        .configure(auth::configure)
        .configure(admin::configure);
}

/// Fallback handler for unmatched routes.
pub async fn route_not_found() -> ApiResult<actix_web::HttpResponse> {
    Err(Error::not_found(ROUTE_NOT_FOUND))
}
