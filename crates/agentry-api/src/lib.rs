// Agentry API library
// Decision: Router assembly lives here so the binary, export-openapi and tests share it

pub mod advanced;
pub mod auth;
pub mod basic;
pub mod common;
pub mod config;
pub mod hello;
pub mod llm_providers;
pub mod openapi;
pub mod orchestration;
pub mod state;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub use auth::ApiKeyAuth;
pub use config::AppConfig;
pub use openapi::ApiDoc;
pub use state::{AppState, Providers};

pub const ROOT_MESSAGE: &str = "FastAPI Agent System Running with Orchestration";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness message; no API key required
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is running", body = RootResponse)),
    security(()),
    tag = "root"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// Every agent route, behind the API key check
pub fn protected_routes(state: AppState, auth: ApiKeyAuth) -> Router {
    Router::new()
        .merge(hello::routes(state.clone()))
        .merge(basic::routes(state.clone()))
        .merge(advanced::routes(state.clone()))
        .merge(llm_providers::routes(state.clone()))
        .merge(orchestration::routes(state))
        .route_layer(middleware::from_fn_with_state(auth, auth::require_api_key))
}

/// Nest under `api_prefix` when one is configured
pub fn build_router_with_prefix(api_routes: Router, api_prefix: &str) -> Router {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::ORIGIN,
                header::CACHE_CONTROL,
                HeaderName::from_static(auth::API_KEY_HEADER),
            ]),
    )
}

/// Full application: root, docs, protected routes, CORS and request tracing
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.as_deref());
    let api_routes = protected_routes(state, auth);

    let app = Router::new()
        .route("/", get(root))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let app = match cors_layer(&config.cors_allowed_origins) {
        Some(cors) => {
            tracing::info!(origins = ?config.cors_allowed_origins, "CORS origins configured");
            app.layer(cors)
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}
