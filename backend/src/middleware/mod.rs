//! Actix middleware shared by every route.
//!
//! [`Trace`] scopes a correlation identifier to each request and writes the
//! access log. Authentication is an extractor concern, see
//! `inbound::http::authentication`.

pub mod trace;

pub use trace::Trace;
