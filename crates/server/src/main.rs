use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use catalog_api::{
    create_product_action, delete_product_action, get_product, list_products,
    update_product_action, ApiContext,
};
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{ActionOutcome, ProductForm},
};
use storage::Storage;
use tracing::{error, info};

mod config;
mod extract;

use config::{load_settings, normalize_database_url};
use extract::{ApiForm, ApiPath};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
    storage: Storage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if settings.seed_on_startup {
        let seeded = storage.seed_if_empty().await.map_err(|error| {
            error!(%error, "failed to seed product catalog");
            error
        })?;
        info!(seeded, "product seed checked");
    }

    let storage = storage.with_latency(settings.store_latency());
    let state = AppState {
        api: ApiContext::new(storage.clone()),
        storage,
    };
    let app = build_router(Arc::new(state));

    let listener = bind_listener(&settings.server_bind).await?;
    let addr = listener.local_addr()?;
    info!(%addr, latency_ms = settings.store_latency_ms, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Accepts any `host:port`, host names included.
async fn bind_listener(server_bind: &str) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(server_bind).await
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/products", get(http_list_products).post(http_create_product))
        .route(
            "/products/:product_id",
            get(http_get_product)
                .post(http_update_product)
                .delete(http_delete_product),
        )
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::internal(e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, (StatusCode, Json<ApiError>)> {
    let products = list_products(&state.api).await.map_err(error_response)?;
    Ok(Json(products))
}

async fn http_get_product(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<i64>,
) -> Result<Json<Product>, (StatusCode, Json<ApiError>)> {
    let product = get_product(&state.api, ProductId(product_id))
        .await
        .map_err(error_response)?;
    Ok(Json(product))
}

async fn http_create_product(
    State(state): State<Arc<AppState>>,
    ApiForm(form): ApiForm<ProductForm>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let outcome = create_product_action(&state.api, &form)
        .await
        .map_err(error_response)?;
    Ok(outcome_response(outcome))
}

async fn http_update_product(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<i64>,
    ApiForm(form): ApiForm<ProductForm>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let outcome = update_product_action(&state.api, ProductId(product_id), &form)
        .await
        .map_err(error_response)?;
    Ok(outcome_response(outcome))
}

async fn http_delete_product(
    State(state): State<Arc<AppState>>,
    ApiPath(product_id): ApiPath<i64>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    delete_product_action(&state.api, ProductId(product_id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

fn outcome_response(outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::Redirect(route) => Redirect::to(route).into_response(),
        ActionOutcome::Invalid(form_state) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(form_state)).into_response()
        }
    }
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Internal => {
            error!(message = %err.message, "product action failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
