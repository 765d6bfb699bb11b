// Hello and story agent HTTP routes

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{ok_or_500, ApiError, ApiJson, ErrorResponse, MessageRequest, ResponseBody};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicRequest {
    #[schema(example = "a dragon who learns to bake")]
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutlineResponse {
    pub outline: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agent/hello", post(hello))
        .route("/agents/story/baseline", post(story_baseline))
        .route("/agents/story/custom", post(story_custom))
        .route("/agents/story/advanced", post(story_advanced))
        .route("/agents/story/deterministic", post(story_deterministic))
        .with_state(state)
}

/// Greet through the hello agent
#[utoipa::path(
    post,
    path = "/agent/hello",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = ResponseBody),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "hello"
)]
pub async fn hello(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MessageRequest>,
) -> Result<Json<ResponseBody>, ApiError> {
    let output = state.hello.run_hello_agent(&req.message).await;
    Ok(Json(ResponseBody {
        response: ok_or_500(output)?,
    }))
}

fn outline(output: String) -> Result<Json<OutlineResponse>, ApiError> {
    Ok(Json(OutlineResponse {
        outline: ok_or_500(output)?,
    }))
}

/// Outline via the `generate_story_outline` tool
#[utoipa::path(
    post,
    path = "/agents/story/baseline",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Story outline", body = OutlineResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "story"
)]
pub async fn story_baseline(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TopicRequest>,
) -> Result<Json<OutlineResponse>, ApiError> {
    outline(state.story.run_baseline(&req.topic).await)
}

/// Four-part outline via the `generate_custom_outline` tool
#[utoipa::path(
    post,
    path = "/agents/story/custom",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Story outline", body = OutlineResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "story"
)]
pub async fn story_custom(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TopicRequest>,
) -> Result<Json<OutlineResponse>, ApiError> {
    outline(state.story.run_custom(&req.topic).await)
}

/// Structured outline expanded into a story
#[utoipa::path(
    post,
    path = "/agents/story/advanced",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Expanded story", body = OutlineResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "story"
)]
pub async fn story_advanced(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TopicRequest>,
) -> Result<Json<OutlineResponse>, ApiError> {
    outline(state.story.run_advanced(&req.topic).await)
}

/// Outline, story and ending in a fixed sequence
#[utoipa::path(
    post,
    path = "/agents/story/deterministic",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Complete story", body = OutlineResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "story"
)]
pub async fn story_deterministic(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TopicRequest>,
) -> Result<Json<OutlineResponse>, ApiError> {
    outline(state.story.run_deterministic(&req.topic).await)
}
