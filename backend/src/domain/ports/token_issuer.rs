//! Port for issuing and verifying signed session tokens.

use crate::domain::{AccountId, Role, SessionToken, TokenClaims};

use super::define_port_error;

define_port_error! {
    /// Failures raised while encoding or decoding tokens.
    pub enum TokenError {
        /// Token is not `header.payload.signature` or does not decode.
        Malformed { message: String } => "token malformed: {message}",
        /// Signature does not match the payload.
        BadSignature => "token signature mismatch",
        /// Token is past its expiry.
        Expired => "token expired",
        /// Claims could not be encoded.
        Encoding { message: String } => "token encoding failed: {message}",
    }
}

/// Signs and verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `account_id` acting as `role`.
    fn issue(&self, account_id: AccountId, role: Role) -> Result<SessionToken, TokenError>;

    /// Verify a token and return its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
