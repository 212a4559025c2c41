//! HS256 JSON Web Tokens signed with a shared secret.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(signature)`
//! without padding. Only the `HS256` algorithm is accepted on verify.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{AccountId, Role, SessionToken, TokenClaims};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Length of generated secrets in bytes.
pub const GENERATED_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

/// Random signing secret for processes without a configured one.
///
/// Tokens signed with it stop verifying when the process restarts.
pub fn generate_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0_u8; GENERATED_SECRET_LEN]);
    OsRng.fill_bytes(secret.as_mut_slice());
    secret
}

/// Signs and verifies session tokens with HMAC-SHA256.
pub struct HmacTokenIssuer {
    secret: Zeroizing<Vec<u8>>,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl HmacTokenIssuer {
    /// Create an issuer whose tokens live for `ttl`.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            clock,
        }
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| TokenError::encoding(err.to_string()))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|err| TokenError::encoding(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| TokenError::malformed(format!("{what}: {err}")))
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, account_id: AccountId, role: Role) -> Result<SessionToken, TokenError> {
        let iat = self.clock.utc().timestamp();
        let claims = TokenClaims {
            sub: account_id,
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        let header = encode_json(&Header {
            alg: ALGORITHM,
            typ: TOKEN_TYPE,
        })?;
        let payload = encode_json(&claims)?;
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input)?.finalize().into_bytes());
        Ok(SessionToken::new(format!("{signing_input}.{signature}")))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::malformed("expected three segments"));
        };

        let header_bytes = decode_segment(header, "header")?;
        let parsed: Header<'_> = serde_json::from_slice(&header_bytes)
            .map_err(|err| TokenError::malformed(format!("header: {err}")))?;
        if parsed.alg != ALGORITHM {
            return Err(TokenError::malformed(format!(
                "unsupported algorithm {}",
                parsed.alg
            )));
        }

        let signature = decode_segment(signature, "signature")?;
        let signing_input = &token[..header.len() + 1 + payload.len()];
        self.mac(signing_input)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::bad_signature())?;

        let claims: TokenClaims = serde_json::from_slice(&decode_segment(payload, "payload")?)
            .map_err(|err| TokenError::malformed(format!("payload: {err}")))?;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        Ok(claims)
    }
}
