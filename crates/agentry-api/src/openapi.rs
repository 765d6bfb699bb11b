// OpenAPI specification
//
// Served by the API (Swagger UI) and printed by the export-openapi binary.

use agentry_providers::{
    PromptRequest, ProviderResponse, Recommendation, RecommendationRequest, ResponseStatus, Usage,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::common::{ErrorResponse, InputRequest, MessageBody, MessageRequest, ResponseBody};
use crate::{advanced, basic, hello, llm_providers, orchestration};

struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-KEY"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::root,
        hello::hello,
        hello::story_baseline,
        hello::story_custom,
        hello::story_advanced,
        hello::story_deterministic,
        basic::lifecycle_initialize,
        basic::lifecycle_execute,
        basic::lifecycle_terminate,
        basic::dynamic_prompt_update,
        basic::dynamic_prompt_execute,
        basic::generic_lifecycle_execute,
        basic::stream_text,
        basic::stream_items,
        advanced::generic_lifecycle_execute,
        advanced::multi_tool_execute,
        llm_providers::openai,
        llm_providers::gemini,
        llm_providers::requestry,
        llm_providers::openrouter,
        llm_providers::recommend_model,
        orchestration::input_guardrails,
        orchestration::output_guardrails,
        orchestration::handoffs,
        orchestration::trace_status,
        orchestration::get_trace,
    ),
    components(
        schemas(
            ErrorResponse, MessageRequest, InputRequest, ResponseBody, MessageBody,
            crate::RootResponse,
            hello::TopicRequest, hello::OutlineResponse,
            basic::ResultBody, basic::UpdatePromptRequest, basic::PromptBody,
            basic::StreamItemsRequest,
            advanced::MultiToolRequest, advanced::MultiToolResponse,
            PromptRequest, ProviderResponse, ResponseStatus, Usage,
            RecommendationRequest, Recommendation,
            orchestration::OrchestrationRequest, orchestration::OrchestrationResponse,
        )
    ),
    modifiers(&ApiKeySecurity),
    security(("api_key" = [])),
    tags(
        (name = "root", description = "Service status"),
        (name = "hello", description = "Hello agent"),
        (name = "story", description = "Story generation agents"),
        (name = "basic", description = "Lifecycle, dynamic prompt and streaming agents"),
        (name = "advanced", description = "Generic lifecycle and multi-tool agents"),
        (name = "llm-providers", description = "Hosted LLM providers and model recommendation"),
        (name = "orchestration", description = "Guardrails, handoffs and traces")
    ),
    info(
        title = "Agentry API",
        version = "0.5.0",
        description = "Tool-calling agents, streaming, multi-provider LLM access and orchestration",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn to_json() -> String {
        ApiDoc::openapi()
            .to_pretty_json()
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}
