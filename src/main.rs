use accounts_api::{
    auth::{AccountStore, InMemoryAccountStore},
    config::AppConfig,
    create_router, db, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Accounts API - Starting...");

    if let Err(e) = run().await {
        tracing::error!("Accounts API stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let store: Arc<dyn AccountStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;

            // Run SQLx migrations on startup
            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;
            tracing::info!("Migrations completed successfully");

            Arc::new(db::PgAccountStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory and lost on restart");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let state = AppState::from_config(&config, store)?;
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Accounts API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
