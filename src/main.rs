use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;

use crate::auth::JwtService;
use crate::config::Config;

/// Shared application state — cheap to clone (keys and pool are refcounted).
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub jwt: JwtService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,asset_ease=debug".parse().unwrap()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Asset Ease  —  Rust + Axum          ║");
    info!("║  accounts · inventory · requests     ║");
    info!("╚══════════════════════════════════════╝");

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established.");

    // Run pending migrations
    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    let state = AppState {
        db: pool,
        jwt: JwtService::new(&config.jwt_secret, auth::TOKEN_TTL_SECS),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Banner / health ─────────────────────────────────────────────────
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))

        // ── Accounts ────────────────────────────────────────────────────────
        .route(
            "/hr-account",
            post(handlers::accounts::create_hr_account),
        )
        .route(
            "/hr-account/:email",
            get(handlers::accounts::get_hr_account),
        )
        .route(
            "/employee-account",
            get(handlers::accounts::list_unaffiliated_employees)
                .post(handlers::accounts::create_employee_account),
        )
        .route(
            "/employee-account/:email",
            get(handlers::accounts::get_employee_account)
                .patch(handlers::accounts::update_employee),
        )
        .route(
            "/employee-accounts/:email",
            get(handlers::accounts::list_employees_for_sponsor),
        )
        .route("/user", get(handlers::accounts::list_all_accounts))
        .route("/user/:email", get(handlers::accounts::get_user_role))

        // ── Asset inventory ─────────────────────────────────────────────────
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            "/assets/request-count",
            get(handlers::assets::top_requested),
        )
        .route(
            "/assets/:id",
            get(handlers::assets::get_asset)
                .patch(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )

        // ── Request workflow ────────────────────────────────────────────────
        .route(
            "/requested-asset",
            get(handlers::requests::list_my_requests).post(handlers::requests::create_request),
        )
        .route(
            "/requested-asset/pending",
            get(handlers::requests::list_my_pending_requests),
        )
        .route(
            "/requested-asset/monthly",
            get(handlers::requests::list_my_monthly_requests),
        )
        .route(
            "/requested-asset/:id",
            patch(handlers::requests::update_request),
        )
        .route(
            "/requested-assets",
            get(handlers::requests::list_sponsored_requests),
        )
        .route(
            "/requested-assets/pending",
            get(handlers::requests::list_sponsored_pending_requests),
        )

        // ── Token issuance ──────────────────────────────────────────────────
        .route("/jwt", post(handlers::tokens::issue_token))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(middleware::from_fn_with_state(state.clone(), auth::gate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
