use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::User;

pub mod password;

pub use password::{hash_password, verify_password, PasswordError};

/// Token claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: String) -> Self {
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self::with_expiry(user_id, email, role, Duration::hours(expiry_hours as i64))
    }

    pub fn with_expiry(user_id: Uuid, email: String, role: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.email.clone(), user.role.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    encode_with_secret(claims, secret()?)
}

pub fn verify_token(token: &str) -> Result<Claims, JwtError> {
    decode_with_secret(token, secret()?)
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims(ttl: Duration) -> Claims {
        Claims::with_expiry(Uuid::new_v4(), "ada@example.com".to_string(), "manager".to_string(), ttl)
    }

    #[test]
    fn token_round_trip() {
        let original = claims(Duration::hours(1));
        let token = encode_with_secret(&original, SECRET).unwrap();
        let decoded = decode_with_secret(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.email, "ada@example.com");
        assert_eq!(decoded.role, "manager");
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_with_secret(&claims(Duration::hours(-2)), SECRET).unwrap();
        assert!(matches!(decode_with_secret(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_with_secret(&claims(Duration::hours(1)), SECRET).unwrap();
        assert!(matches!(decode_with_secret(&token, "other-secret"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_with_secret("not.a.jwt", SECRET), Err(JwtError::Invalid(_))));
    }
}
