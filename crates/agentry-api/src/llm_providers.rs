// LLM provider HTTP routes
// Decision: Provider failures come back as 200 with status "error" in the body

use agentry_providers::{
    recommend, PromptProvider, PromptRequest, ProviderResponse, Recommendation,
    RecommendationRequest,
};
use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use crate::common::ApiJson;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agents/llm-provider/openai", post(openai))
        .route("/agents/llm-provider/gemini", post(gemini))
        .route("/agents/llm-provider/requestry", post(requestry))
        .route("/agents/llm-provider/openrouter", post(openrouter))
        .route("/agents/llm-provider/recommend-model", post(recommend_model))
        .with_state(state)
}

async fn dispatch(provider: &Arc<dyn PromptProvider>, request: PromptRequest) -> Json<ProviderResponse> {
    let response = provider.process_prompt(&request).await;
    if !response.is_success() {
        tracing::warn!(provider = provider.name(), message = %response.message, "Provider returned an error");
    }
    Json(response)
}

#[utoipa::path(
    post,
    path = "/agents/llm-provider/openai",
    request_body = PromptRequest,
    responses((status = 200, description = "Normalized provider response", body = ProviderResponse)),
    tag = "llm-providers"
)]
pub async fn openai(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PromptRequest>,
) -> Json<ProviderResponse> {
    dispatch(&state.providers.openai, request).await
}

#[utoipa::path(
    post,
    path = "/agents/llm-provider/gemini",
    request_body = PromptRequest,
    responses((status = 200, description = "Normalized provider response", body = ProviderResponse)),
    tag = "llm-providers"
)]
pub async fn gemini(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PromptRequest>,
) -> Json<ProviderResponse> {
    dispatch(&state.providers.gemini, request).await
}

#[utoipa::path(
    post,
    path = "/agents/llm-provider/requestry",
    request_body = PromptRequest,
    responses((status = 200, description = "Normalized provider response", body = ProviderResponse)),
    tag = "llm-providers"
)]
pub async fn requestry(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PromptRequest>,
) -> Json<ProviderResponse> {
    dispatch(&state.providers.requestry, request).await
}

#[utoipa::path(
    post,
    path = "/agents/llm-provider/openrouter",
    request_body = PromptRequest,
    responses((status = 200, description = "Normalized provider response", body = ProviderResponse)),
    tag = "llm-providers"
)]
pub async fn openrouter(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PromptRequest>,
) -> Json<ProviderResponse> {
    dispatch(&state.providers.openrouter, request).await
}

/// Pick a provider and model for a task type and prompt length
#[utoipa::path(
    post,
    path = "/agents/llm-provider/recommend-model",
    request_body = RecommendationRequest,
    responses((status = 200, description = "Recommended provider and model", body = Recommendation)),
    tag = "llm-providers"
)]
pub async fn recommend_model(ApiJson(request): ApiJson<RecommendationRequest>) -> Json<Recommendation> {
    Json(recommend(&request))
}
