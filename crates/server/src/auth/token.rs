//! Signed bearer tokens (HS256 JWT)
//!
//! Stateless: a token is valid iff its signature verifies and it has not
//! expired. No session table is kept.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Identity recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub username: String,
    pub role: Role,
}

/// Issues and validates tokens with one immutable signing secret
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issue a token as if it were minted at `issued_at`
    pub fn issue_at(&self, subject: &str, role: Role, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Internal("token expiry overflow".to_string()))?;

        let claims = Claims {
            sub: subject.to_owned(),
            role,
            iat: issued_at.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Token error: {}", e)))
    }

    /// Fails with `InvalidToken` on bad signature, malformed structure or expiry
    pub fn validate(&self, token: &str) -> Result<TokenSubject> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("[Token] rejected: {}", e);
            Error::InvalidToken
        })?;

        Ok(TokenSubject {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new(b"test-secret-with-enough-length-1234", Duration::hours(1))
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = manager();
        let token = tokens.issue("admin", Role::Admin).unwrap();

        let subject = tokens.validate(&token).unwrap();
        assert_eq!(subject.username, "admin");
        assert_eq!(subject.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = manager();
        let issued = Utc::now() - Duration::hours(2);
        let token = tokens.issue_at("admin", Role::Admin, issued).unwrap();

        assert!(matches!(tokens.validate(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = manager();
        let token = tokens.issue("admin", Role::Admin).unwrap();

        // flip one character in each segment
        for segment in 0..3 {
            let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
            let target = &mut parts[segment];
            let first = target.remove(0);
            target.insert(0, if first == 'A' { 'B' } else { 'A' });
            let tampered = parts.join(".");

            assert!(
                matches!(tokens.validate(&tampered), Err(Error::InvalidToken)),
                "segment {} tamper accepted",
                segment
            );
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = manager().issue("admin", Role::Admin).unwrap();
        let other = TokenManager::new(b"a-completely-different-secret-5678", Duration::hours(1));

        assert!(matches!(other.validate(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let tokens = manager();
        assert!(matches!(tokens.validate("not-a-jwt"), Err(Error::InvalidToken)));
        assert!(matches!(tokens.validate(""), Err(Error::InvalidToken)));
    }
}
