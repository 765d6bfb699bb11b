// Error types for agent runs

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur while running an agent
#[derive(Debug, Error)]
pub enum AgentError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool execution error
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Tool requested by the model is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Run terminated due to max iterations
    #[error("Max iterations ({0}) reached")]
    MaxIterationsReached(usize),

    /// Input guardrail tripwire fired before the model was called
    #[error("Input guardrail '{guardrail}' triggered: {message}")]
    InputGuardrailTriggered { guardrail: String, message: String },

    /// Output guardrail tripwire fired on the final output
    #[error("Output guardrail '{guardrail}' triggered: {message}")]
    OutputGuardrailTriggered { guardrail: String, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AgentError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        AgentError::Llm(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        AgentError::ToolExecution(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AgentError::Configuration(msg.into())
    }

    /// Create an input guardrail error
    pub fn input_guardrail(guardrail: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::InputGuardrailTriggered {
            guardrail: guardrail.into(),
            message: message.into(),
        }
    }

    /// Create an output guardrail error
    pub fn output_guardrail(guardrail: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::OutputGuardrailTriggered {
            guardrail: guardrail.into(),
            message: message.into(),
        }
    }

    /// True when a guardrail (input or output) aborted the run
    pub fn is_guardrail(&self) -> bool {
        matches!(
            self,
            AgentError::InputGuardrailTriggered { .. } | AgentError::OutputGuardrailTriggered { .. }
        )
    }
}
