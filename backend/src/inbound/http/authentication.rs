//! Bearer-token extractors.
//!
//! Handlers take [`CurrentAccount`] to require any signed-in caller, or
//! [`AdminAccount`] to additionally require the `admin` role. Both re-load
//! the account through [`AuthService::authenticate_token`], so deactivated or
//! deleted accounts lose access even while their token is unexpired.
//!
//! [`AuthService::authenticate_token`]: crate::domain::ports::AuthService::authenticate_token

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Account, Error, Role};

use super::state::HttpState;

/// Message when no usable bearer token accompanies a protected request.
pub const MISSING_TOKEN: &str = "Access denied. No token provided.";
/// Message when a non-admin calls an admin endpoint.
pub const ACCESS_DENIED: &str = "Access denied";

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized(MISSING_TOKEN))
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))
}

/// Authenticated caller of any role.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    /// Borrow the loaded account.
    pub fn account(&self) -> &Account {
        &self.0
    }
}

impl FromRequest for CurrentAccount {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let prepared = bearer_token(req).and_then(|token| Ok((token, http_state(req)?)));
        Box::pin(async move {
            let (token, state) = prepared?;
            let account = state.auth.authenticate_token(&token).await?;
            Ok(Self(account))
        })
    }
}

/// Authenticated caller holding the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminAccount(pub Account);

impl AdminAccount {
    /// Borrow the loaded account.
    pub fn account(&self) -> &Account {
        &self.0
    }
}

impl FromRequest for AdminAccount {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentAccount::from_request(req, payload);
        Box::pin(async move {
            let CurrentAccount(account) = current.await?;
            if account.role == Role::Admin {
                Ok(Self(account))
            } else {
                Err(Error::forbidden(ACCESS_DENIED).into())
            }
        })
    }
}
