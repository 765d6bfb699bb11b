// Function tools and the registry the runner dispatches through
//
// A tool answers with a ToolExecutionResult. Argument problems are reported
// back to the model as `{"error": ...}`; internal failures are logged and the
// model only sees a generic message.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::error;

use crate::error::{AgentError, Result};
use crate::tool_types::{FunctionTool, ToolCall, ToolDefinition, ToolResult};
use crate::traits::ToolExecutor;

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while executing the tool";

#[derive(Debug)]
pub enum ToolExecutionResult {
    Success(Value),
    /// Shown to the model, e.g. "Missing required argument: text"
    ToolError(String),
    /// Logged only
    InternalError(String),
}

impl ToolExecutionResult {
    pub fn success(value: impl Into<Value>) -> Self {
        ToolExecutionResult::Success(value.into())
    }

    pub fn tool_error(message: impl Into<String>) -> Self {
        ToolExecutionResult::ToolError(message.into())
    }

    pub fn internal_error(error: impl std::fmt::Display) -> Self {
        ToolExecutionResult::InternalError(error.to_string())
    }

    fn into_tool_result(self, call: &ToolCall) -> ToolResult {
        let value = match self {
            ToolExecutionResult::Success(value) => value,
            ToolExecutionResult::ToolError(message) => json!({ "error": message }),
            ToolExecutionResult::InternalError(message) => {
                error!(
                    tool_name = %call.name,
                    tool_call_id = %call.id,
                    error = %message,
                    "Tool failed internally"
                );
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
        };
        ToolResult {
            tool_call_id: call.id.clone(),
            result: Some(value),
            error: None,
        }
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

fn required<'a, T>(
    arguments: &'a Value,
    name: &str,
    extract: impl FnOnce(&'a Value) -> Option<T>,
) -> std::result::Result<T, ToolExecutionResult> {
    arguments
        .get(name)
        .and_then(extract)
        .ok_or_else(|| ToolExecutionResult::tool_error(format!("Missing required argument: {}", name)))
}

pub fn required_str<'a>(arguments: &'a Value, name: &str) -> std::result::Result<&'a str, ToolExecutionResult> {
    required(arguments, name, Value::as_str)
}

pub fn required_f64(arguments: &Value, name: &str) -> std::result::Result<f64, ToolExecutionResult> {
    required(arguments, name, Value::as_f64)
}

pub fn required_i64(arguments: &Value, name: &str) -> std::result::Result<i64, ToolExecutionResult> {
    required(arguments, name, Value::as_i64)
}

pub fn required_array<'a>(
    arguments: &'a Value,
    name: &str,
) -> std::result::Result<&'a Vec<Value>, ToolExecutionResult> {
    required(arguments, name, Value::as_array)
}

// ============================================================================
// Tool trait
// ============================================================================

/// A function the model can call by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique within a registry
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, arguments: Value) -> ToolExecutionResult;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::Function(FunctionTool {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        })
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Tools by name. Registering a name twice replaces the earlier tool.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            registry: Self::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) {
        self.register_arc(Arc::from(tool));
    }

    /// Share a tool that is already registered elsewhere
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names in no particular order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn list_available_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn tool_descriptions(&self) -> BTreeMap<String, String> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect()
    }

    /// Definitions sent with each model call, sorted by name
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_available_tools())
            .finish()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(&tool_call.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;

        let outcome = tool.execute(tool_call.arguments.clone()).await;
        Ok(outcome.into_tool_result(tool_call))
    }
}

pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
}

impl ToolRegistryBuilder {
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.registry.register(tool);
        self
    }

    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{AddTool, EchoTool};
    use serde_json::json;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing_tool"
        }

        fn description(&self) -> &str {
            "Always fails internally"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _arguments: Value) -> ToolExecutionResult {
            ToolExecutionResult::internal_error("connection refused: db.internal:5432")
        }
    }

    #[test]
    fn test_registry_listing_is_sorted() {
        let registry = ToolRegistry::builder().tool(EchoTool).tool(AddTool).build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_available_tools(), vec!["add", "echo"]);

        let descriptions = registry.tool_descriptions();
        assert_eq!(descriptions.len(), 2);
        assert!(descriptions["echo"].contains("Echo"));
    }

    #[test]
    fn test_registering_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(EchoTool);
        registry.register_boxed(Box::new(EchoTool));
        assert_eq!(registry.len(), 1);
        assert!(registry.has("echo"));
        assert!(registry.get("add").is_none());
    }

    #[tokio::test]
    async fn test_registry_executes_tool_call() {
        let registry = ToolRegistry::builder().tool(AddTool).build();
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "add".to_string(),
            arguments: json!({"a": 2, "b": 3}),
        };

        let result = registry.execute(&call).await.unwrap();
        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(result.result, Some(json!(5.0)));
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "nope".to_string(),
            arguments: json!({}),
        };

        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_internal_error_is_hidden() {
        let registry = ToolRegistry::builder().tool(FailingTool).build();
        let call = ToolCall {
            id: "call_9".to_string(),
            name: "failing_tool".to_string(),
            arguments: json!({}),
        };

        let result = registry.execute(&call).await.unwrap();
        let payload = result.result.unwrap();
        assert_eq!(payload, json!({"error": INTERNAL_ERROR_MESSAGE}));
    }

    #[test]
    fn test_argument_helpers() {
        let args = json!({"text": "hi", "n": 4, "x": 1.5, "items": [1, 2]});
        assert_eq!(required_str(&args, "text").unwrap(), "hi");
        assert_eq!(required_i64(&args, "n").unwrap(), 4);
        assert_eq!(required_f64(&args, "x").unwrap(), 1.5);
        assert_eq!(required_array(&args, "items").unwrap().len(), 2);

        match required_str(&args, "missing") {
            Err(ToolExecutionResult::ToolError(msg)) => {
                assert_eq!(msg, "Missing required argument: missing")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
