// JWT token generation and validation service

use crate::auth::error::AuthError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime: one day
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // account id
    pub iat: i64,        // issued at timestamp
    pub exp: i64,        // expiration timestamp
}

/// Token service for JWT operations
///
/// Expiry is checked with zero leeway: a token is expired from the second
/// `now == exp` onwards.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key and default lifetime
    ///
    /// An empty secret is rejected here rather than at first use.
    pub fn new(secret: &str, token_duration: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::TokenSigningError(
                "signing secret must not be empty".to_string(),
            ));
        }
        if token_duration <= 0 {
            return Err(AuthError::TokenSigningError(format!(
                "token lifetime must be positive, got {}",
                token_duration
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration,
        })
    }

    /// Configured token lifetime in seconds
    pub fn token_duration(&self) -> i64 {
        self.token_duration
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        self.sign(subject, self.token_duration)
    }

    /// Issue a token for `subject` valid for `ttl` seconds
    pub fn sign(&self, subject: Uuid, ttl: i64) -> Result<String, AuthError> {
        self.sign_at(subject, ttl, Utc::now().timestamp())
    }

    fn sign_at(&self, subject: Uuid, ttl: i64, now: i64) -> Result<String, AuthError> {
        let exp = now.checked_add(ttl).ok_or_else(|| {
            AuthError::TokenSigningError(format!("token lifetime of {}s overflows the clock", ttl))
        })?;
        let claims = Claims {
            sub: subject,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigningError(e.to_string()))
    }

    /// Verify a token and return its subject
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
            .map(|claims| claims.sub)
    }

    /// Verify a token against an explicit clock reading
    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::TokenInvalid);
        }

        // Expiry is checked below so the boundary is ours, not the library's
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)?;

        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
