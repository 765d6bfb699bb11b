// Tool definitions, calls and results exchanged with the LLM
//
// Tools are identified by name. The registry resolves a ToolCall to a Tool
// implementation and packages its outcome as a ToolResult.

use serde::{Deserialize, Serialize};

/// Tool definition advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    /// Function tool - executed in-process via ToolRegistry
    Function(FunctionTool),
}

impl ToolDefinition {
    /// Name of the tool
    pub fn name(&self) -> &str {
        match self {
            ToolDefinition::Function(f) => &f.name,
        }
    }
}

/// Function tool description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTool {
    /// Tool name (used by LLM and for registry lookup)
    pub name: String,
    /// Tool description for LLM
    pub description: String,
    /// JSON schema for tool parameters
    pub parameters: serde_json::Value,
}

/// Tool call from LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,
    /// Tool name to execute
    pub name: String,
    /// Arguments as JSON
    pub arguments: serde_json::Value,
}

/// Tool execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool call ID this result corresponds to
    pub tool_call_id: String,
    /// Result data (success)
    pub result: Option<serde_json::Value>,
    /// Error message (failure)
    pub error: Option<String>,
}

impl ToolResult {
    /// Payload sent back to the model as the tool message content
    pub fn content(&self) -> String {
        match (&self.result, &self.error) {
            (Some(serde_json::Value::String(s)), _) => s.clone(),
            (Some(value), _) => value.to_string(),
            (None, Some(err)) => serde_json::json!({ "error": err }).to_string(),
            (None, None) => "null".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_tool_deserialization() {
        let json = r#"{
            "type": "function",
            "name": "fetch_mock_data",
            "description": "Fetch mock data",
            "parameters": {"type": "object"}
        }"#;

        let tool: ToolDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name(), "fetch_mock_data");
    }

    #[test]
    fn test_tool_result_content_unwraps_strings() {
        let result = ToolResult {
            tool_call_id: "call_1".to_string(),
            result: Some(serde_json::json!("Echo: hi")),
            error: None,
        };
        assert_eq!(result.content(), "Echo: hi");

        let result = ToolResult {
            tool_call_id: "call_2".to_string(),
            result: Some(serde_json::json!({"sum": 3})),
            error: None,
        };
        assert_eq!(result.content(), r#"{"sum":3}"#);
    }

    #[test]
    fn test_tool_result_content_for_error() {
        let result = ToolResult {
            tool_call_id: "call_3".to_string(),
            result: None,
            error: Some("boom".to_string()),
        };
        assert_eq!(result.content(), r#"{"error":"boom"}"#);
    }
}
