//! Credential adapters: Argon2id password hashing and HS256 session tokens.

mod argon2_password_hasher;
mod hmac_token_issuer;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use hmac_token_issuer::{GENERATED_SECRET_LEN, HmacTokenIssuer, generate_secret};
