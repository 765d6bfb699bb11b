// Basic agent HTTP routes: lifecycle, dynamic prompt, generic lifecycle and streaming

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures::{
    stream::{self, Stream},
    StreamExt,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use utoipa::ToSchema;

use crate::common::{ApiError, ApiJson, ErrorResponse, InputRequest, MessageBody, MessageRequest, ResponseBody};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultBody {
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePromptRequest {
    #[schema(example = "You are a pirate. Answer like one.")]
    pub new_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromptBody {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StreamItemsRequest {
    #[schema(example = "jokes")]
    pub category: String,
    /// Clamped to 1..=10; the model picks when absent
    #[serde(default)]
    pub count: Option<i64>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agents/basic/lifecycle/initialize", post(lifecycle_initialize))
        .route("/agents/basic/lifecycle/execute", post(lifecycle_execute))
        .route("/agents/basic/lifecycle/terminate", post(lifecycle_terminate))
        .route("/agents/basic/dynamic-prompt/update", post(dynamic_prompt_update))
        .route("/agents/basic/dynamic-prompt/execute", post(dynamic_prompt_execute))
        .route("/agents/basic/generic-lifecycle/execute", post(generic_lifecycle_execute))
        .route("/agents/basic/stream-text", post(stream_text))
        .route("/agents/basic/stream-items", post(stream_items))
        .with_state(state)
}

// ============================================
// Lifecycle
// ============================================

#[utoipa::path(
    post,
    path = "/agents/basic/lifecycle/initialize",
    responses((status = 200, description = "Agent initialized", body = MessageBody)),
    tag = "basic"
)]
pub async fn lifecycle_initialize(State(state): State<AppState>) -> Json<MessageBody> {
    Json(MessageBody {
        message: state.lifecycle.initialize(),
    })
}

#[utoipa::path(
    post,
    path = "/agents/basic/lifecycle/execute",
    request_body = InputRequest,
    responses((status = 200, description = "Processed input", body = ResultBody)),
    tag = "basic"
)]
pub async fn lifecycle_execute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InputRequest>,
) -> Json<ResultBody> {
    Json(ResultBody {
        result: state.lifecycle.execute(&req.input),
    })
}

#[utoipa::path(
    post,
    path = "/agents/basic/lifecycle/terminate",
    responses((status = 200, description = "Agent terminated", body = MessageBody)),
    tag = "basic"
)]
pub async fn lifecycle_terminate(State(state): State<AppState>) -> Json<MessageBody> {
    Json(MessageBody {
        message: state.lifecycle.terminate(),
    })
}

// ============================================
// Dynamic prompt
// ============================================

#[utoipa::path(
    post,
    path = "/agents/basic/dynamic-prompt/update",
    request_body = UpdatePromptRequest,
    responses((status = 200, description = "Prompt replaced", body = PromptBody)),
    tag = "basic"
)]
pub async fn dynamic_prompt_update(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdatePromptRequest>,
) -> Json<PromptBody> {
    Json(PromptBody {
        prompt: state.dynamic_prompt.update_system_prompt(&req.new_prompt).await,
    })
}

#[utoipa::path(
    post,
    path = "/agents/basic/dynamic-prompt/execute",
    request_body = InputRequest,
    responses((status = 200, description = "Response under the current prompt", body = ResponseBody)),
    tag = "basic"
)]
pub async fn dynamic_prompt_execute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InputRequest>,
) -> Json<ResponseBody> {
    Json(ResponseBody {
        response: state.dynamic_prompt.execute(&req.input).await,
    })
}

// ============================================
// Generic lifecycle
// ============================================

#[utoipa::path(
    post,
    path = "/agents/basic/generic-lifecycle/execute",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = ResponseBody),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "basic"
)]
pub async fn generic_lifecycle_execute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MessageRequest>,
) -> Result<Json<ResponseBody>, ApiError> {
    let result = state
        .basic_generic
        .run(&req.message)
        .await
        .map_err(|e| ApiError::internal(format!("Error: {}", e)))?;
    Ok(Json(ResponseBody {
        response: result.final_output,
    }))
}

// ============================================
// Streaming
// ============================================

/// Text deltas as `text` events, then a single `done` event
#[utoipa::path(
    post,
    path = "/agents/basic/stream-text",
    request_body = InputRequest,
    responses(
        (status = 200, description = "Text stream", content_type = "text/event-stream"),
        (status = 500, description = "Model call failed", body = ErrorResponse)
    ),
    tag = "basic"
)]
pub async fn stream_text(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InputRequest>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let status = state.stream_text.initialize();
    tracing::info!(agent = %status.name, status = %status.status, "Starting text stream");

    let chunks = state
        .stream_text
        .execute(&req.input)
        .await
        .map_err(|e| ApiError::internal(format!("Error: {}", e)))?;

    let agent = state.stream_text.clone();
    let events = chunks
        .map(|chunk| match chunk {
            // SSE data lines cannot carry carriage returns
            Ok(text) => SseEvent::default().event("text").data(text.replace('\r', "")),
            Err(e) => SseEvent::default()
                .event("error")
                .data(e.to_string().replace('\r', "")),
        })
        .chain(stream::once(async move {
            let status = agent.terminate();
            tracing::info!(agent = %status.name, status = %status.status, "Text stream finished");
            SseEvent::default().event("done").data("[DONE]")
        }))
        .map(Ok::<_, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// One JSON event per status, count, item and completion
#[utoipa::path(
    post,
    path = "/agents/basic/stream-items",
    request_body = StreamItemsRequest,
    responses((status = 200, description = "Item stream", content_type = "text/event-stream")),
    tag = "basic"
)]
pub async fn stream_items(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StreamItemsRequest>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    tracing::info!(category = %req.category, count = ?req.count, "Starting item stream");

    let events = state
        .stream_items
        .execute(&req.category, req.count)
        .map(|event| {
            let event = SseEvent::default().json_data(&event).unwrap_or_else(|e| {
                SseEvent::default()
                    .event("error")
                    .data(format!("failed to encode event: {}", e))
            });
            Ok::<_, Infallible>(event)
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}
