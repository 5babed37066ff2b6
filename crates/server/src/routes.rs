pub mod auth;
pub mod haircuts;
pub mod users;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

/// Upper bound on files per request, used to size the body limit.
const MAX_FILES_PER_REQUEST: usize = 10;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses(
        (status = 200, description = "Service and database reachable", body = crate::openapi::HealthResponse),
        (status = 503, description = "Database unreachable", body = crate::openapi::HealthResponse)
    )
)]
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match models::db::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, Json(Health::ok())),
        Err(e) => {
            warn!(err = %e, "database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { status: "unavailable" }))
        }
    }
}

/// Build the application router: catalogue and account routes behind the
/// bearer middleware, stored media, and the Swagger UI.
pub fn build_router(state: ServerState, cors: CorsLayer, media: &configs::MediaConfig) -> Router {
    let body_limit = media.max_upload_bytes.saturating_mul(MAX_FILES_PER_REQUEST);

    let api = Router::new()
        .route("/health", get(health))
        .route("/haircut", get(haircuts::list).post(haircuts::create))
        .route(
            "/haircut/:id",
            get(haircuts::get).put(haircuts::update).patch(haircuts::update).delete(haircuts::delete),
        )
        .route("/user", get(users::list).post(users::create))
        .route(
            "/user/:id",
            get(users::get).put(users::update).patch(users::update).delete(users::delete),
        )
        .route("/auth/token", post(auth::obtain_token))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route("/auth/change-password", post(auth::change_password));

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/media", ServeDir::new(&media.root))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request carrying method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
        .with_state(state)
}
