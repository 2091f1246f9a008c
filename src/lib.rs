// Accounts API library
// Account registration, sign-in and profile updates behind bearer tokens

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod redact;
pub mod request_log;
pub mod validation;

use axum::{
    extract::FromRef,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    handlers,
    models::{
        AccountView, AuthResponse, ProfileSummary, SigninRequest, SignupRequest,
        UpdateAccountRequest, UpdateAccountResponse,
    },
    AccountStore, AuthError, AuthService, PasswordService, TokenService,
};
use config::AppConfig;

/// Adds the bearer token security scheme to the generated document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        handlers::signup_handler,
        handlers::signin_handler,
        handlers::update_account_handler,
        handlers::profile_handler,
        handlers::list_accounts_handler,
        handlers::delete_account_handler,
    ),
    components(
        schemas(
            SignupRequest,
            SigninRequest,
            UpdateAccountRequest,
            AuthResponse,
            UpdateAccountResponse,
            ProfileSummary,
            AccountView
        )
    ),
    tags(
        (name = "auth", description = "Registration, sign-in and credential updates"),
        (name = "user", description = "Account profile endpoints")
    ),
    info(
        title = "Accounts API",
        version = "1.0.0",
        description = "Account registration and bearer token authentication"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        let token_service = auth_service.token_service();
        Self {
            auth_service,
            token_service,
        }
    }

    /// Wire the credential services from configuration over `store`
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn AccountStore>,
    ) -> Result<Self, AuthError> {
        let password_service =
            PasswordService::with_memory(config.salt_rounds, config.hash_memory_kib)?;
        let token_service = Arc::new(TokenService::new(
            &config.jwt_secret,
            config.token_ttl_seconds,
        )?);
        let auth_service = AuthService::new(store, password_service, token_service)?;

        Ok(Self::new(Arc::new(auth_service)))
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.token_service)
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and request logging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/api/auth/signup", post(handlers::signup_handler))
        .route("/api/auth/signin", post(handlers::signin_handler))
        .route("/api/auth/update", patch(handlers::update_account_handler))
        // User routes
        .route("/api/user/update", patch(handlers::update_account_handler))
        .route("/api/user/profile", get(handlers::profile_handler))
        .route(
            "/api/user",
            get(handlers::list_accounts_handler).delete(handlers::delete_account_handler),
        )
        .layer(axum::middleware::from_fn(request_log::log_requests))
        .layer(cors)
        .with_state(state)
}
