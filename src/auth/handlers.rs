// HTTP handlers for authentication and account endpoints

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, StatusCode},
    Json,
};
use crate::auth::{
    middleware::AuthenticatedAccount,
    models::{
        AccountView, AuthResponse, SigninRequest, SignupRequest, UpdateAccountRequest,
        UpdateAccountResponse,
    },
};
use crate::error::ApiError;
use crate::AppState;
use std::net::{IpAddr, SocketAddr};
use validator::Validate;

type AuthorizationHeader = [(header::HeaderName, String); 1];

fn bearer_header(token: &str) -> AuthorizationHeader {
    [(header::AUTHORIZATION, format!("Bearer {}", token))]
}

fn client_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<IpAddr> {
    connect_info.map(|ConnectInfo(addr)| addr.ip())
}

/// Register a new account
/// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (
            status = 201,
            description = "Account created, bearer token in the Authorization header and body",
            body = AuthResponse
        ),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email or nickname already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, AuthorizationHeader, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let token = state
        .auth_service
        .signup(&request.email, &request.nickname, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        bearer_header(&token),
        Json(AuthResponse::bearer("User created successfully", token)),
    ))
}

/// Sign in with email and password
/// POST /api/auth/signin
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninRequest,
    responses(
        (
            status = 200,
            description = "Signed in, bearer token in the Authorization header and body",
            body = AuthResponse
        ),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn signin_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<(StatusCode, AuthorizationHeader, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let token = state
        .auth_service
        .signin(&request.email, &request.password, client_ip(connect_info))
        .await?;

    Ok((
        StatusCode::OK,
        bearer_header(&token),
        Json(AuthResponse::bearer("User logged in successfully", token)),
    ))
}

/// Update email, nickname or password of the authenticated account
/// PATCH /api/auth/update and PATCH /api/user/update
#[utoipa::path(
    patch,
    path = "/api/auth/update",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = UpdateAccountResponse),
        (status = 400, description = "Invalid input data or nothing to change"),
        (
            status = 401,
            description = "Missing, invalid or expired token, or wrong current password"
        ),
        (status = 404, description = "Account no longer exists"),
        (status = 409, description = "Value taken by another account or unchanged"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_account_handler(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<UpdateAccountResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let (current_password, changes) = request.into_parts();
    let view = state
        .auth_service
        .update_profile(account.account_id, &current_password, changes, client_ip(connect_info))
        .await?;

    Ok(Json(UpdateAccountResponse::from(view)))
}

/// Get the authenticated account
/// GET /api/user/profile
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Account profile", body = AccountView),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn profile_handler(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> Result<Json<AccountView>, ApiError> {
    let view = state.auth_service.profile(account.account_id).await?;
    Ok(Json(view))
}

/// List all accounts
/// GET /api/user
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "All accounts, oldest first", body = Vec<AccountView>),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn list_accounts_handler(
    State(state): State<AppState>,
    _account: AuthenticatedAccount,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let accounts = state.auth_service.list_accounts().await?;
    tracing::debug!("Listed {} accounts", accounts.len());
    Ok(Json(accounts))
}

/// Delete the authenticated account
/// DELETE /api/user
#[utoipa::path(
    delete,
    path = "/api/user",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Account no longer exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn delete_account_handler(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> Result<StatusCode, ApiError> {
    state.auth_service.delete_account(account.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
