//! Bunkerdesk API composition root.

#![forbid(unsafe_code)]

mod catalog;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bunkerdesk_application::{RecordService, ResourceRegistry};
use bunkerdesk_core::AppError;
use bunkerdesk_infrastructure::{PostgresRecordRepository, PostgresSequenceStore};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let registry = Arc::new(ResourceRegistry::new(catalog::bunkering_catalog()?)?);
    let record_repository = Arc::new(PostgresRecordRepository::new(pool.clone()));
    let sequence_store = Arc::new(PostgresSequenceStore::new(pool.clone()));

    let app_state = AppState {
        record_service: RecordService::new(record_repository, sequence_store, registry),
        postgres_pool: pool,
    };

    let api_routes = Router::new()
        .route(
            "/api/resources",
            get(handlers::catalog::list_resources_handler),
        )
        .route(
            "/api/resources/{resource_type}/records",
            get(handlers::records::list_records_handler)
                .post(handlers::records::create_record_handler),
        )
        .route(
            "/api/resources/{resource_type}/records/{record_id}",
            get(handlers::records::get_record_handler)
                .put(handlers::records::update_record_handler)
                .patch(handlers::records::update_record_handler)
                .delete(handlers::records::delete_record_handler),
        )
        .route_layer(from_fn(middleware::require_actor_for_mutations));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::ACTOR_SUBJECT_HEADER),
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Validation(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to bind listener: {error}")))?;

    info!(%address, "bunkerdesk-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Persistence(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
