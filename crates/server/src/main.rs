use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{
    check_health, hello, hello_route, list_organization_names, organizations_route, ApiContext,
};
use shared::{
    domain::OrganizationList,
    error::{ApiError, ErrorCode},
    protocol::{HelloResponse, API_PREFIX},
};
use storage::Storage;
use tower_http::{
    compression::{predicate::SizeAbove, CompressionLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod cors;

use app_state::AppState;
use config::{load_settings, prepare_database_url, Settings};

/// Responses smaller than this are sent uncompressed. `u16` because
/// `SizeAbove::new` takes one.
const GZIP_MIN_BYTES: u16 = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::with_replicas(&database_url, &settings.replica_database_urls)
        .await
        .map_err(|error| {
            error!(
                %database_url,
                %error,
                "failed to open SQLite database; verify parent directory exists and permissions are correct"
            );
            error
        })?;
    info!(
        %database_url,
        replicas = storage.replica_count(),
        environment = settings.environment.as_deref().unwrap_or("unset"),
        "storage ready"
    );

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), &settings);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    let api = Router::new()
        .route(hello_route(), get(http_hello))
        .route(organizations_route(), get(http_list_organizations));

    Router::new()
        .route("/healthz", get(healthz))
        .nest(API_PREFIX, api)
        .with_state(state)
        .layer(CompressionLayer::new().compress_when(SizeAbove::new(GZIP_MIN_BYTES)))
        .layer(cors::cors_layer(&settings.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    check_health(&state.api).await.map_err(into_response)?;
    Ok("ok")
}

async fn http_hello() -> Json<HelloResponse> {
    Json(hello())
}

async fn http_list_organizations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrganizationList>, (StatusCode, Json<ApiError>)> {
    let names = list_organization_names(&state.api)
        .await
        .map_err(into_response)?;
    Ok(Json(names))
}

fn into_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
