//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::sync::Arc;
use std::time::Duration;

use auth::middleware::AuthGateState;
use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use commerce::{
    CommerceConfig, HttpGatewayConfig, HttpPaymentGateway, PgCommerceRepository, commerce_router,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,commerce=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Configuration
    let auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        // In production, load secrets from environment
        AuthConfig {
            token_secret: load_secret("SESSION_TOKEN_SECRET")?,
            cookie_secret: load_secret("COOKIE_SECRET")?,
            ..AuthConfig::default()
        }
    };

    let commerce_config = CommerceConfig {
        order_page_url: env::var("ORDER_PAGE_URL").unwrap_or_else(|_| "/orders".to_string()),
        failure_url: env::var("PAYMENT_FAILURE_URL")
            .unwrap_or_else(|_| "/orders/failed".to_string()),
        ..CommerceConfig::default()
    };

    let gateway_config = HttpGatewayConfig {
        base_url: env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| HttpGatewayConfig::default().base_url),
        merchant_id: env::var("PAYMENT_MERCHANT_ID").unwrap_or_default(),
        callback_url: env::var("PAYMENT_CALLBACK_URL")
            .unwrap_or_else(|_| HttpGatewayConfig::default().callback_url),
        ..HttpGatewayConfig::default()
    };

    let auth_repo = PgAuthRepository::new(pool.clone());
    let commerce_repo = PgCommerceRepository::new(pool.clone());
    let gateway = HttpPaymentGateway::new(gateway_config)
        .map_err(|e| anyhow::anyhow!("gateway init failed: {e}"))?;

    // Periodic housekeeping: expired sessions/OTP entries, expired
    // discounts, stale PAYING orders. Also runs once at startup.
    let housekeeping_interval = env::var("HOUSEKEEPING_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600);
    spawn_housekeeping(
        auth_repo.clone(),
        commerce_repo.clone(),
        commerce_config.stale_order_age,
        Duration::from_secs(housekeeping_interval),
    );

    // Auth gate shared with the commerce routes
    let gate = AuthGateState {
        repo: Arc::new(auth_repo.clone()),
        config: Arc::new(auth_config.clone()),
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(auth_repo, auth_config))
        .nest(
            "/api",
            commerce_router(commerce_repo, gateway, commerce_config, gate),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Decode a 32-byte base64 secret from the environment
fn load_secret(name: &str) -> anyhow::Result<[u8; 32]> {
    let encoded = env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set in production"))?;
    let bytes = Engine::decode(&general_purpose::STANDARD, &encoded)?;
    let mut secret = [0u8; 32];
    if bytes.len() != secret.len() {
        anyhow::bail!("{name} must decode to exactly 32 bytes");
    }
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

/// Run periodic housekeeping in the background
///
/// Errors are logged and never terminate the loop; a failed cleanup
/// just retries on the next tick.
fn spawn_housekeeping(
    auth_repo: PgAuthRepository,
    commerce_repo: PgCommerceRepository,
    stale_order_age: Duration,
    interval: Duration,
) {
    use auth::domain::repository::SessionStore;
    use commerce::domain::repository::{DiscountRepository, OrderRepository};

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            match auth_repo.cleanup_expired().await {
                Ok(deleted) => {
                    if deleted > 0 {
                        tracing::info!(entries_deleted = deleted, "Session/OTP cleanup completed");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session/OTP cleanup failed, continuing anyway");
                }
            }

            if let Err(e) = commerce_repo.delete_expired_discounts().await {
                tracing::warn!(error = %e, "Discount cleanup failed, continuing anyway");
            }

            let cutoff = chrono::Utc::now()
                - chrono::Duration::from_std(stale_order_age)
                    .unwrap_or_else(|_| chrono::Duration::hours(24));
            if let Err(e) = commerce_repo.fail_stale_orders(cutoff).await {
                tracing::warn!(error = %e, "Stale order cleanup failed, continuing anyway");
            }
        }
    });
}
