//! Text Capability - greeting, echo and string tools

use super::{Capability, CapabilityId};
use crate::tools::{required_str, Tool, ToolExecutionResult};
use async_trait::async_trait;
use serde_json::Value;

/// Text capability - echo, hello, uppercase and concatenate
pub struct TextCapability;

impl Capability for TextCapability {
    fn id(&self) -> &str {
        CapabilityId::TEXT
    }

    fn name(&self) -> &str {
        "Text"
    }

    fn description(&self) -> &str {
        "Adds simple string tools (hello_world_tool, echo, to_uppercase, concatenate)."
    }

    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(HelloWorldTool),
            Box::new(EchoTool),
            Box::new(ToUppercaseTool),
            Box::new(ConcatenateTool),
        ]
    }
}

// ============================================================================
// Tool: hello_world_tool
// ============================================================================

/// Tool that returns a fixed greeting
pub struct HelloWorldTool;

#[async_trait]
impl Tool for HelloWorldTool {
    fn name(&self) -> &str {
        "hello_world_tool"
    }

    fn description(&self) -> &str {
        "Returns a friendly greeting."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, _arguments: Value) -> ToolExecutionResult {
        ToolExecutionResult::success("Hello, world!")
    }
}

// ============================================================================
// Tool: echo
// ============================================================================

/// Tool that echoes a message back
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the given message back to the caller."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string", "description": "The message to echo" }
            },
            "required": ["message"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "message") {
            Ok(message) => ToolExecutionResult::success(format!("Echo: {}", message)),
            Err(e) => e,
        }
    }
}

// ============================================================================
// Tool: to_uppercase
// ============================================================================

pub struct ToUppercaseTool;

#[async_trait]
impl Tool for ToUppercaseTool {
    fn name(&self) -> &str {
        "to_uppercase"
    }

    fn description(&self) -> &str {
        "Convert text to uppercase."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to convert" }
            },
            "required": ["text"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "text") {
            Ok(text) => ToolExecutionResult::success(text.to_uppercase()),
            Err(e) => e,
        }
    }
}

// ============================================================================
// Tool: concatenate
// ============================================================================

pub struct ConcatenateTool;

#[async_trait]
impl Tool for ConcatenateTool {
    fn name(&self) -> &str {
        "concatenate"
    }

    fn description(&self) -> &str {
        "Concatenate two strings."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "str1": { "type": "string", "description": "First string" },
                "str2": { "type": "string", "description": "Second string" }
            },
            "required": ["str1", "str2"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let str1 = match required_str(&arguments, "str1") {
            Ok(s) => s,
            Err(e) => return e,
        };
        let str2 = match required_str(&arguments, "str2") {
            Ok(s) => s,
            Err(e) => return e,
        };
        ToolExecutionResult::success(format!("{}{}", str1, str2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run(tool: &dyn Tool, args: Value) -> Value {
        match tool.execute(args).await {
            ToolExecutionResult::Success(v) => v,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hello_world() {
        assert_eq!(run(&HelloWorldTool, json!({})).await, json!("Hello, world!"));
    }

    #[tokio::test]
    async fn test_echo() {
        assert_eq!(
            run(&EchoTool, json!({"message": "ping"})).await,
            json!("Echo: ping")
        );
    }

    #[tokio::test]
    async fn test_uppercase_and_concatenate() {
        assert_eq!(
            run(&ToUppercaseTool, json!({"text": "Hello"})).await,
            json!("HELLO")
        );
        assert_eq!(
            run(&ConcatenateTool, json!({"str1": "foo", "str2": "bar"})).await,
            json!("foobar")
        );
    }

    #[tokio::test]
    async fn test_echo_requires_message() {
        assert!(matches!(
            EchoTool.execute(json!({})).await,
            ToolExecutionResult::ToolError(_)
        ));
    }
}
