//! Institute backend library modules.
//!
//! Admission intake, account authentication and administration exposed over
//! a REST API, laid out hexagonally: [`domain`] holds entities, ports and
//! services; [`inbound`] and [`outbound`] hold the adapters; [`server`]
//! wires them together from [`settings`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
