// Agentry core
//
// Building blocks for the agent service: tools and their registry, the
// runner loop with hooks and guardrails, LLM drivers, trace collection and
// the agent wrappers exposed over HTTP.

pub mod agents;
pub mod capabilities;
pub mod context;
pub mod error;
pub mod guardrails;
pub mod hooks;
pub mod llm;
pub mod memory;
pub mod openai;
pub mod operations;
pub mod runner;
pub mod state;
pub mod tool_types;
pub mod tools;
pub mod traces;
pub mod traits;

pub use agents::SharedProvider;
pub use capabilities::{apply_capabilities, Capability, CapabilityId, CapabilityRegistry};
pub use context::ContextManager;
pub use error::{AgentError, Result};
pub use guardrails::{Guardrail, GuardrailOutput};
pub use hooks::{LoggingHooks, NoopHooks, RunHooks};
pub use llm::{
    LlmCallConfig, LlmMessage, LlmMessageRole, LlmProvider, LlmResponse, LlmStreamEvent,
    ToolChoice, TurnSummary,
};
pub use memory::{ScriptedLlmProvider, ScriptedResponse};
pub use openai::OpenAiProtocolLlmProvider;
pub use operations::{OperationResult, OperationTool, OperationToolAdapter};
pub use runner::{Agent, RunResult, Runner};
pub use state::{AgentState, StateMachine};
pub use tool_types::{ToolCall, ToolDefinition, ToolResult};
pub use tools::{Tool, ToolExecutionResult, ToolRegistry};
pub use traces::{format_trace_for_display, ActiveTrace, Trace, TraceProcessor, TraceSummary};
pub use traits::ToolExecutor;
