// Orchestration HTTP routes: guardrails, handoffs and trace inspection

use agentry_core::agents::{GuardrailAgent, GuardrailVerdict};
use agentry_core::format_trace_for_display;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::common::{ApiError, ApiJson, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrchestrationRequest {
    #[schema(example = "I was charged twice on my last invoice")]
    pub message: String,
    /// Caller metadata; logged, not forwarded to the model
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub context: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OrchestrationResponse {
    /// "success" or "blocked"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_triggered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl OrchestrationResponse {
    fn success(response: impl Into<Value>) -> Self {
        Self {
            status: "success".to_string(),
            response: Some(response.into()),
            ..Default::default()
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agents/orchestration/input-guardrails", post(input_guardrails))
        .route("/agents/orchestration/output-guardrails", post(output_guardrails))
        .route("/agents/orchestration/handoffs", post(handoffs))
        .route("/agents/orchestration/trace-status", get(trace_status))
        .route("/agents/orchestration/traces/:trace_id", get(get_trace))
        .with_state(state)
}

async fn run_guarded(
    agent: &GuardrailAgent,
    req: &OrchestrationRequest,
) -> Result<Json<OrchestrationResponse>, ApiError> {
    if let Some(context) = &req.context {
        tracing::debug!(keys = ?context.keys().collect::<Vec<_>>(), "Orchestration request context");
    }

    let run = agent
        .run(&req.message)
        .await
        .map_err(|e| ApiError::internal(format!("Error: {}", e)))?;

    let response = match run.verdict {
        GuardrailVerdict::Passed { output } => OrchestrationResponse {
            guardrail_triggered: Some(false),
            trace_id: Some(run.trace_id),
            ..OrchestrationResponse::success(output)
        },
        GuardrailVerdict::Blocked {
            stage,
            guardrail,
            message,
        } => {
            tracing::info!(?stage, guardrail = %guardrail, "Guardrail blocked request");
            OrchestrationResponse {
                status: "blocked".to_string(),
                response: Some(Value::String(message)),
                guardrail_triggered: Some(true),
                handoff_agent: None,
                trace_id: Some(run.trace_id),
            }
        }
    };
    Ok(Json(response))
}

/// Screen the message before the model sees it
#[utoipa::path(
    post,
    path = "/agents/orchestration/input-guardrails",
    request_body = OrchestrationRequest,
    responses(
        (status = 200, description = "Model answer, or blocked", body = OrchestrationResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "orchestration"
)]
pub async fn input_guardrails(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OrchestrationRequest>,
) -> Result<Json<OrchestrationResponse>, ApiError> {
    run_guarded(&state.input_guardrails, &req).await
}

/// Screen the model's answer before it is returned
#[utoipa::path(
    post,
    path = "/agents/orchestration/output-guardrails",
    request_body = OrchestrationRequest,
    responses(
        (status = 200, description = "Model answer, or blocked", body = OrchestrationResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "orchestration"
)]
pub async fn output_guardrails(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OrchestrationRequest>,
) -> Result<Json<OrchestrationResponse>, ApiError> {
    run_guarded(&state.output_guardrails, &req).await
}

/// Route the message to a billing, technical, sales or general specialist
#[utoipa::path(
    post,
    path = "/agents/orchestration/handoffs",
    request_body = OrchestrationRequest,
    responses(
        (status = 200, description = "Specialist answer", body = OrchestrationResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    tag = "orchestration"
)]
pub async fn handoffs(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OrchestrationRequest>,
) -> Result<Json<OrchestrationResponse>, ApiError> {
    let outcome = state
        .handoff
        .handle(&req.message)
        .await
        .map_err(|e| ApiError::internal(format!("Error: {}", e)))?;

    Ok(Json(OrchestrationResponse {
        handoff_agent: Some(outcome.agent_name),
        trace_id: Some(outcome.trace_id),
        ..OrchestrationResponse::success(outcome.response)
    }))
}

/// Summary of the traces collected so far
#[utoipa::path(
    get,
    path = "/agents/orchestration/trace-status",
    responses((status = 200, description = "Trace summary", body = OrchestrationResponse)),
    tag = "orchestration"
)]
pub async fn trace_status(State(state): State<AppState>) -> Json<OrchestrationResponse> {
    let summary = state.traces.get_trace_summary();
    let mut response = serde_json::to_value(&summary).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut response {
        map.insert(
            "orchestration_mode".to_string(),
            Value::String(state.orchestration_mode.to_string()),
        );
    }
    Json(OrchestrationResponse::success(response))
}

/// One trace rendered as text
#[utoipa::path(
    get,
    path = "/agents/orchestration/traces/{trace_id}",
    params(("trace_id" = String, Path, description = "Trace ID")),
    responses(
        (status = 200, description = "Formatted trace", body = OrchestrationResponse),
        (status = 404, description = "Trace not found", body = ErrorResponse)
    ),
    tag = "orchestration"
)]
pub async fn get_trace(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
) -> Result<Json<OrchestrationResponse>, ApiError> {
    let trace = state
        .traces
        .get_trace(&trace_id)
        .ok_or_else(|| ApiError::not_found("Trace not found"))?;

    Ok(Json(OrchestrationResponse {
        trace_id: Some(trace.trace_id.clone()),
        ..OrchestrationResponse::success(format_trace_for_display(&trace))
    }))
}
