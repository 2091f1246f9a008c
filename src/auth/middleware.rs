// Authentication guard for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use crate::auth::{error::AuthError, token::TokenService};
use crate::error::ApiError;
use crate::redact::token_fingerprint;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolve the account id carried by an `Authorization: Bearer <token>` header
///
/// Every failure is logged with its reason and a token fingerprint. Missing
/// and malformed headers are reported as `TokenInvalid`.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<Uuid, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        warn!(reason = "missing", "Rejected request without Authorization header");
        return Err(AuthError::TokenInvalid);
    };

    let Ok(value) = value.to_str() else {
        warn!(reason = "not_ascii", "Rejected Authorization header with non-visible characters");
        return Err(AuthError::TokenInvalid);
    };

    let Some(token) = value.strip_prefix(BEARER_PREFIX) else {
        warn!(reason = "scheme", "Rejected Authorization header without Bearer scheme");
        return Err(AuthError::TokenInvalid);
    };

    let token = token.trim();
    match tokens.verify(token) {
        Ok(account_id) => {
            debug!(account_id = %account_id, "Bearer token accepted");
            Ok(account_id)
        }
        Err(err) => {
            let reason = match err {
                AuthError::TokenExpired => "expired",
                _ => "invalid",
            };
            warn!(
                reason,
                token = %token_fingerprint(token),
                "Rejected bearer token"
            );
            Err(err)
        }
    }
}

/// Authenticated account extractor for protected routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        let account_id = authenticate(&parts.headers, &tokens)?;

        Ok(AuthenticatedAccount { account_id })
    }
}
