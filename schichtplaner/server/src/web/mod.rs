use axum::Json;
use axum::Router;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::user::password::{Argon2Hasher, CredentialHasher};

pub mod envelope;
pub mod extract;
pub mod openapi;

pub use envelope::{ApiError, ApiResponse, StatusResponse};

/// Shared state handed to every resource router.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Creates state backed by the given connection and the Argon2 password hasher.
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::with_hasher(db, Arc::new(Argon2Hasher::new()))
    }

    /// Creates state with an explicit password hasher.
    pub fn with_hasher(db: Arc<DatabaseConnection>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { db, hasher }
    }
}

/// Builds the complete application router: resources, health check, API docs and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(crate::todo::api::create_api_router(state.clone()))
        .merge(crate::user::api::create_api_router(state.clone()))
        .merge(crate::department::api::create_api_router(state.clone()))
        .merge(crate::shift::api::create_api_router(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .fallback(fallback_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors_layer()),
        )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure("Internal server error")),
    )
        .into_response()
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let db = Database::connect(config.database_url()).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!(
        "Database {} opened and migrations applied successfully",
        config.sqlite_db_path
    );

    let app = create_app(AppState::new(Arc::new(db.clone())));

    let server_address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    tracing::info!("Database connection closed, shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting shutdown"),
    }
}

/// Liveness probe.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = StatusResponse)),
    tag = "Health"
)]
pub async fn health_check_handler() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("OK"))
}

async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route")
}
