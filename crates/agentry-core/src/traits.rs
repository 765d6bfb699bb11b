// Core traits for pluggable backends
//
// The runner only depends on these traits, so tests can swap in
// in-memory implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::tool_types::{ToolCall, ToolResult};

// ============================================================================
// ToolExecutor - For executing tool calls
// ============================================================================

/// Trait for executing tool calls requested by the model
///
/// Implementations can:
/// - Dispatch to in-process tools (ToolRegistry)
/// - Return canned results for testing
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a single tool call
    async fn execute(&self, tool_call: &ToolCall) -> Result<ToolResult>;
}
