// Agent wrappers
//
// Each wrapper configures an `Agent` (instructions, tools, guardrails) and
// drives it through the `Runner`, or, for the lifecycle demos, answers
// without a model at all.

use std::sync::Arc;

use crate::llm::LlmProvider;

pub mod dynamic_prompt;
pub mod generic_lifecycle;
pub mod guardrail;
pub mod handoff;
pub mod hello;
pub mod lifecycle;
pub mod multi_tool;
pub mod story;
pub mod stream_items;
pub mod stream_text;

pub use dynamic_prompt::DynamicPromptAgent;
pub use generic_lifecycle::{GenericAgentConfig, GenericLifecycleAgent};
pub use guardrail::{GuardrailAgent, GuardrailRun, GuardrailVerdict};
pub use handoff::{determine_agent_type, HandoffAgent, HandoffOutcome, SpecialistType};
pub use hello::HelloAgent;
pub use lifecycle::LifecycleAgent;
pub use multi_tool::{MultiToolAgent, MultiToolAgentConfig, MultiToolOutput, StateTrackingHooks};
pub use story::StoryAgents;
pub use stream_items::{ItemEvent, StreamItemsAgent};
pub use stream_text::StreamTextAgent;

/// Provider handle shared between wrappers
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Render an error the way wrapper endpoints report it
pub(crate) fn error_text(err: impl std::fmt::Display) -> String {
    format!("Error: {}", err)
}
