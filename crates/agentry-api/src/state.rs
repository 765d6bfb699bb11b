// Application state shared by every router

use agentry_core::agents::{
    DynamicPromptAgent, GenericAgentConfig, GenericLifecycleAgent, GuardrailAgent, HandoffAgent,
    HelloAgent, LifecycleAgent, MultiToolAgent, MultiToolAgentConfig, StoryAgents,
    StreamItemsAgent, StreamTextAgent,
};
use agentry_core::{
    CapabilityRegistry, OpenAiProtocolLlmProvider, SharedProvider, TraceProcessor,
};
use agentry_providers::{
    GeminiProvider, OpenAiProvider, OpenRouterProvider, PromptProvider, RequestryProvider,
};
use std::sync::Arc;

use crate::config::{AppConfig, OrchestrationMode};

pub const BASIC_GENERIC_INSTRUCTIONS: &str =
    "Utilize provided tools to process user messages intelligently.";

/// Prompt providers keyed by route
#[derive(Clone)]
pub struct Providers {
    pub openai: Arc<dyn PromptProvider>,
    pub gemini: Arc<dyn PromptProvider>,
    pub requestry: Arc<dyn PromptProvider>,
    pub openrouter: Arc<dyn PromptProvider>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            openai: Arc::new(OpenAiProvider::new(config.openai_api_key.clone())),
            gemini: Arc::new(GeminiProvider::new(config.gemini_api_key.clone())),
            requestry: Arc::new(RequestryProvider::new(config.requestry_api_key.clone())),
            openrouter: Arc::new(OpenRouterProvider::new(
                config.openrouter_api_key.clone(),
                config.openrouter_referer.clone(),
                Some(config.openrouter_title.clone()),
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub llm: SharedProvider,
    pub model: String,
    pub orchestration_mode: OrchestrationMode,
    pub traces: TraceProcessor,
    pub capabilities: Arc<CapabilityRegistry>,
    pub providers: Providers,

    pub hello: Arc<HelloAgent>,
    pub story: Arc<StoryAgents>,
    pub lifecycle: Arc<LifecycleAgent>,
    pub dynamic_prompt: Arc<DynamicPromptAgent>,
    pub basic_generic: Arc<GenericLifecycleAgent>,
    pub advanced_generic: Arc<GenericLifecycleAgent>,
    pub multi_tool: Arc<MultiToolAgent>,
    pub stream_text: Arc<StreamTextAgent>,
    pub stream_items: StreamItemsAgent,
    pub input_guardrails: Arc<GuardrailAgent>,
    pub output_guardrails: Arc<GuardrailAgent>,
    pub handoff: Arc<HandoffAgent>,
}

impl AppState {
    /// Wire every agent to `llm`
    pub fn new(config: &AppConfig, llm: SharedProvider, providers: Providers) -> Self {
        let model = config.agent_model.clone();
        let traces = TraceProcessor::new();

        let basic_config = GenericAgentConfig::new("GenericLifecycleAgent", BASIC_GENERIC_INSTRUCTIONS)
            .with_tools(GenericAgentConfig::default().tools);

        Self {
            hello: Arc::new(HelloAgent::new(llm.clone(), model.clone())),
            story: Arc::new(StoryAgents::new(llm.clone(), &model, traces.clone())),
            lifecycle: Arc::new(LifecycleAgent::new()),
            dynamic_prompt: Arc::new(DynamicPromptAgent::new()),
            basic_generic: Arc::new(GenericLifecycleAgent::new(basic_config, llm.clone(), &model)),
            advanced_generic: Arc::new(GenericLifecycleAgent::new(
                GenericAgentConfig::default(),
                llm.clone(),
                &model,
            )),
            multi_tool: Arc::new(MultiToolAgent::new(
                MultiToolAgentConfig::default(),
                llm.clone(),
                &model,
            )),
            stream_text: Arc::new(StreamTextAgent::new(llm.clone())),
            stream_items: StreamItemsAgent::new(llm.clone()),
            input_guardrails: Arc::new(
                GuardrailAgent::new(llm.clone(), &model, traces.clone())
                    .with_output_guardrails(Vec::new())
                    .with_trace_name("Input Guardrails"),
            ),
            output_guardrails: Arc::new(
                GuardrailAgent::new(llm.clone(), &model, traces.clone())
                    .with_input_guardrails(Vec::new())
                    .with_trace_name("Output Guardrails"),
            ),
            handoff: Arc::new(HandoffAgent::new(llm.clone(), model.clone(), traces.clone())),
            capabilities: Arc::new(CapabilityRegistry::with_builtins()),
            orchestration_mode: config.orchestration_mode,
            providers,
            traces,
            model,
            llm,
        }
    }

    /// Production wiring: OpenAI-protocol driver plus the four hosted providers
    pub fn from_config(config: &AppConfig) -> Self {
        let api_key = config.openai_api_key.clone().unwrap_or_default();
        let llm: SharedProvider = match &config.openai_base_url {
            Some(url) => Arc::new(OpenAiProtocolLlmProvider::with_base_url(api_key, url)),
            None => Arc::new(OpenAiProtocolLlmProvider::new(api_key)),
        };
        Self::new(config, llm, Providers::from_config(config))
    }
}
