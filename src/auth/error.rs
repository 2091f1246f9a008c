// Credential lifecycle error types
//
// These carry no HTTP vocabulary; status mapping happens in crate::error.

use std::fmt;
use thiserror::Error;

/// Account field covered by a uniqueness or self-change rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Email,
    Nickname,
    Password,
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountField::Email => write!(f, "email"),
            AccountField::Nickname => write!(f, "nickname"),
            AccountField::Password => write!(f, "password"),
        }
    }
}

/// Failures returned by the credential core
///
/// Business-rule variants are meant to be shown to the caller. The
/// infrastructure variants carry internal detail that must only be logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Email or nickname already belongs to an account
    #[error("{0} already exists")]
    AlreadyExists(AccountField),

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Requested change equals the current value
    #[error("You cannot change {0} to the same one")]
    NoOpChange(AccountField),

    /// Update request named no field to change
    #[error("No changes requested")]
    EmptyUpdate,

    /// Account addressed by id does not exist
    #[error("Account not found")]
    NotFound,

    /// Bearer token absent, malformed or carrying a bad signature
    #[error("Invalid token")]
    TokenInvalid,

    /// Bearer token past its expiry
    #[error("Token has expired")]
    TokenExpired,

    #[error("Password hashing error: {0}")]
    HashingError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Token signing error: {0}")]
    TokenSigningError(String),
}

impl AuthError {
    /// True for failures caused by infrastructure rather than by the caller
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::HashingError(_)
                | AuthError::StorageError(_)
                | AuthError::TokenSigningError(_)
        )
    }
}
