//! Success envelope shared by every JSON endpoint.
//!
//! Clients receive `{success:true, message, data?}`; failures use
//! [`super::error::ErrorEnvelope`] instead.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Success payload wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap `data` with a message.
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

impl Envelope<()> {
    /// Message-only success.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// `200 OK` with data.
pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    Envelope::with_data(message, data).respond(StatusCode::OK)
}

/// `201 Created` with data.
pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    Envelope::with_data(message, data).respond(StatusCode::CREATED)
}

/// `200 OK` carrying only a message.
pub fn ok_message(message: &str) -> HttpResponse {
    Envelope::message(message).respond(StatusCode::OK)
}
