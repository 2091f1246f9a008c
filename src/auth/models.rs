// Account data models and DTOs

use crate::validation::validate_nickname;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Account record as persisted by an `AccountStore`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an account; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub nickname: String,
    pub password_hash: String,
}

/// Partial update applied by `AccountStore::update_fields`
/// `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.nickname.is_none() && self.password_hash.is_none()
    }
}

/// Profile changes requested by an authenticated account holder
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub new_password: Option<String>,
}

/// Account view returned to callers (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountView {
    #[schema(example = "b1f53c85-29a2-48cd-99fe-d2b1e9c72616")]
    pub id: Uuid,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "userNickname")]
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            nickname: account.nickname,
            created_at: account.created_at,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(custom = "validate_nickname")]
    #[schema(example = "username")]
    pub nickname: String,
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    #[schema(example = "pass1234")]
    pub password: String,
}

/// Sign-in request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SigninRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(example = "pass1234")]
    pub password: String,
}

/// Account update request DTO
///
/// `password` is the current password and is always required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    #[schema(example = "pass1234")]
    pub password: String,
    #[validate(email(message = "Email must be a valid email address"))]
    #[schema(example = "newUser@example.com")]
    pub email: Option<String>,
    #[validate(custom = "validate_nickname")]
    #[schema(example = "newUsername")]
    pub nickname: Option<String>,
    #[serde(alias = "newPassword")]
    #[validate(length(
        min = 8,
        max = 20,
        message = "New password must be between 8 and 20 characters"
    ))]
    #[schema(example = "pass12345")]
    pub new_password: Option<String>,
}

impl UpdateAccountRequest {
    /// Split into the current password and the requested changes
    pub fn into_parts(self) -> (String, ProfileChanges) {
        (
            self.password,
            ProfileChanges {
                email: self.email,
                nickname: self.nickname,
                new_password: self.new_password,
            },
        )
    }
}

/// Authentication response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
}

impl AuthResponse {
    pub fn bearer(message: &str, access_token: String) -> Self {
        Self {
            message: message.to_string(),
            access_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Public part of an updated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileSummary {
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "username123")]
    pub nickname: String,
}

/// Account update response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountResponse {
    #[schema(example = "User updated successfully")]
    pub message: String,
    pub user: ProfileSummary,
}

impl From<AccountView> for UpdateAccountResponse {
    fn from(view: AccountView) -> Self {
        Self {
            message: "User updated successfully".to_string(),
            user: ProfileSummary {
                email: view.email,
                nickname: view.nickname,
            },
        }
    }
}
