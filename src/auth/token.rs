// src/auth/token.rs
//! Signed, time-bound token encoding and decoding.
//!
//! Pure cryptographic/serialization logic; no I/O. Issuance and verification
//! share the same UTC clock and the codec applies zero expiry leeway, so a
//! token is rejected the moment `now > exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;

use super::models::Claims;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is malformed or its signature is invalid")]
    Invalid,
}

/// A freshly issued token together with its lifetime bounds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Encodes and decodes the JWTs this service issues
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: String, algorithm: Algorithm, ttl_hours: i64) -> Self {
        Self {
            secret,
            algorithm,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a signed token binding `subject` until now + ttl
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        let value = encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| TokenError::Invalid)?;

        Ok(IssuedToken {
            value,
            issued_at,
            expires_at,
        })
    }

    /// Verify signature and expiry, returning the embedded subject
    pub fn parse(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test_secret_key".to_string(), Algorithm::HS256, 24)
    }

    #[test]
    fn test_issue_parse_round_trip() {
        let codec = codec();
        let issued = codec.issue("U_K7NP3X").unwrap();

        let subject = codec.parse(&issued.value).unwrap();
        assert_eq!(subject, "U_K7NP3X");
        assert!(issued.expires_at > issued.issued_at);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Negative ttl puts exp in the past while the signature stays valid
        let codec = TokenCodec::new("test_secret_key".to_string(), Algorithm::HS256, -1);
        let issued = codec.issue("U_K7NP3X").unwrap();

        let verifier = TokenCodec::new("test_secret_key".to_string(), Algorithm::HS256, 24);
        let err = verifier.parse(&issued.value).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issued = codec().issue("U_K7NP3X").unwrap();

        let other = TokenCodec::new("wrong_secret_key".to_string(), Algorithm::HS256, 24);
        let err = other.parse(&issued.value).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let err = codec().parse("not-a-jwt").unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn test_wrong_algorithm_is_invalid() {
        let issued = codec().issue("U_K7NP3X").unwrap();

        let other = TokenCodec::new("test_secret_key".to_string(), Algorithm::HS384, 24);
        let err = other.parse(&issued.value).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }
}
