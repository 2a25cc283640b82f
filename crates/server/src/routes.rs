use axum::{
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::{ErrorBody, Health};

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod auth;
pub mod pages;
pub mod tickets;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn page_not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("page not found")))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public pages, session-guarded `/app`
/// pages, and static assets from `frontend_dir` as the fallback.
pub fn build_router(state: ServerState, cors: CorsLayer, frontend_dir: &str) -> Router {
    let static_dir = ServeDir::new(frontend_dir).not_found_service(page_not_found.into_service());

    let public = Router::new()
        .route("/health", get(health))
        .route("/signup", get(pages::signup_page).post(auth::signup))
        .route("/login", get(pages::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/pagenotfound", get(page_not_found))
        .route("/api-docs/openapi.json", get(openapi_json));

    // every handler here takes a SessionContext
    let app = Router::new()
        .route("/app", get(pages::app_root))
        .route("/app/dashboard", get(pages::dashboard))
        .route("/app/tickets", get(tickets::list).post(tickets::create))
        .route("/app/tickets/:id", put(tickets::update).delete(tickets::delete));

    public
        .merge(app)
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
