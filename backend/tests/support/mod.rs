//! Shared helpers for HTTP integration tests.
//!
//! Each test builds the full application over in-process stores with a
//! temporary upload directory, so no database is required.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use institute::server::{AppState, BootstrapAdmin, ServerConfig, build_state};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@school.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";

/// Application state plus the upload directory it writes into.
pub struct TestStack {
    pub state: AppState,
    pub uploads: TempDir,
}

/// Build the in-process stack with a bootstrapped administrator.
pub async fn stack() -> TestStack {
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let config = ServerConfig::new(
        "127.0.0.1:0".parse().expect("literal address"),
        b"integration-test-secret".to_vec(),
        uploads.path(),
    )
    .with_bootstrap_admin(BootstrapAdmin::new(ADMIN_EMAIL, ADMIN_PASSWORD));
    let state = build_state(&config).await.expect("state builds");
    TestStack { state, uploads }
}

/// Initialise the full application service for `$stack`.
macro_rules! init_app {
    ($stack:expr) => {
        actix_web::test::init_service(institute::server::build_app(
            $stack.state.http_state.clone(),
            $stack.state.health_state.clone(),
        ))
        .await
    };
}

/// Send a `TestRequest` and return the status and decoded JSON body.
macro_rules! send {
    ($app:expr, $request:expr) => {{
        let res = actix_web::test::call_service($app, $request.to_request()).await;
        let status = res.status();
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        (status, body)
    }};
}

/// Complete application body for `email`, accepted by the provisioning rules.
pub fn application(email: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "phone": "9876543210",
        "bloodGroup": "O+",
        "course": "Class 10",
        "dateOfBirth": "2010-12-10",
        "previousPercentage": "91.5",
        "fatherName": "<b>Lord</b> Byron"
    })
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Extract the token from a login envelope.
pub fn token(body: &Value) -> String {
    body["data"]["token"]
        .as_str()
        .expect("login returns a token")
        .to_owned()
}
