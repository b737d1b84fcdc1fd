use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid token format")]
    Malformed,

    #[error("Invalid signature encoding")]
    BadSignatureEncoding,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Invalid claims encoding")]
    BadClaimsEncoding,

    #[error("Invalid claims format")]
    BadClaims,

    #[error("Token expired")]
    Expired,
}

/// Validates an HS256 token issued by the identity provider and returns the caller.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let mut parts = token.split('.');
    let (header_b64, claims_b64, signature_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s), None) => (h, c, s),
        _ => return Err(TokenError::Malformed),
    };

    verify_signature(header_b64, claims_b64, signature_b64, jwt_secret)?;

    let claims = decode_claims(claims_b64)?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err(TokenError::Expired);
        }
    }

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

fn verify_signature(
    header_b64: &str,
    claims_b64: &str,
    signature_b64: &str,
    jwt_secret: &str,
) -> Result<(), TokenError> {
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        TokenError::BadSignatureEncoding
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| TokenError::MissingSecret)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());

    mac.verify_slice(&signature).map_err(|_| {
        debug!("Token signature verification failed");
        TokenError::BadSignature
    })
}

fn decode_claims(claims_b64: &str) -> Result<JwtClaims, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| TokenError::BadClaimsEncoding)?;

    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        TokenError::BadClaims
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn accepts_valid_token() {
        let user = TestUser::admin("admin@example.com");
        let token = JwtTestUtils::create_test_token(&user, SECRET, Some(1));

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.role.as_deref(), Some("admin"));
        assert!(validated.created_at.is_some());
    }

    #[test]
    fn rejects_wrong_secret() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_invalid_signature_token(&user);
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn rejects_expired_token() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_expired_token(&user, SECRET);
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(validate_token("abc.def", SECRET).unwrap_err(), TokenError::Malformed);
        assert_eq!(validate_token("a.b.c.d", SECRET).unwrap_err(), TokenError::Malformed);
        assert_eq!(validate_token("a.b.c", "").unwrap_err(), TokenError::MissingSecret);
    }
}
