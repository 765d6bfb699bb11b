// Advanced agent HTTP routes: generic lifecycle and multi-tool

use agentry_core::agents::{MultiToolAgent, MultiToolAgentConfig};
use agentry_core::apply_capabilities;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::common::{ApiError, ApiJson, ErrorResponse, MessageRequest, ResponseBody};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MultiToolRequest {
    #[schema(example = "Fetch the user data and uppercase the name")]
    pub message: String,
    /// Entries stored in the agent's context before the run
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub context: Option<Map<String, Value>>,
    /// Capability ids ("math", "text", "datetime", "data", "operations") whose tools are added
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MultiToolResponse {
    pub final_output: String,
    #[schema(value_type = Object)]
    pub context: Map<String, Value>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/agents/advanced/generic-lifecycle/execute",
            post(generic_lifecycle_execute),
        )
        .route("/agents/advanced/multi-tool/execute", post(multi_tool_execute))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/agents/advanced/generic-lifecycle/execute",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = ResponseBody),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "advanced"
)]
pub async fn generic_lifecycle_execute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MessageRequest>,
) -> Result<Json<ResponseBody>, ApiError> {
    let result = state
        .advanced_generic
        .run(&req.message)
        .await
        .map_err(|e| ApiError::internal(format!("Error: {}", e)))?;
    Ok(Json(ResponseBody {
        response: result.final_output,
    }))
}

/// Default agent, or one extended with the requested capabilities
fn multi_tool_agent(state: &AppState, capabilities: &[String]) -> Arc<MultiToolAgent> {
    if capabilities.is_empty() {
        return state.multi_tool.clone();
    }

    let mut config = MultiToolAgentConfig::default();
    let ids: Vec<&str> = capabilities.iter().map(String::as_str).collect();
    let applied = apply_capabilities(&config.instructions, &ids, &state.capabilities);
    for name in applied.tool_registry.tool_names() {
        if let Some(tool) = applied.tool_registry.get(name) {
            config.tools.register_arc(tool.clone());
        }
    }
    config.instructions = applied.instructions;
    tracing::debug!(applied = ?applied.applied_ids, tools = config.tools.len(), "Built multi-tool agent");

    Arc::new(MultiToolAgent::new(config, state.llm.clone(), &state.model))
}

/// Always 200: agent failures are reported in `final_output`
#[utoipa::path(
    post,
    path = "/agents/advanced/multi-tool/execute",
    request_body = MultiToolRequest,
    responses((status = 200, description = "Agent output and final context", body = MultiToolResponse)),
    tag = "advanced"
)]
pub async fn multi_tool_execute(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MultiToolRequest>,
) -> Json<MultiToolResponse> {
    let agent = multi_tool_agent(&state, &req.capabilities);
    let output = agent.run(&req.message, req.context).await;
    tracing::info!(states = ?output.states, "Multi-tool run finished");

    Json(MultiToolResponse {
        final_output: output.final_output,
        context: output.context,
    })
}
