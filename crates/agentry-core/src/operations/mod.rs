// Operation tools
//
// Multi-operation tools: each tool receives a JSON object with an
// `operation` field plus operation-specific arguments, validates it, and
// returns an OperationResult { success, data, error }.
//
// OperationToolAdapter exposes any OperationTool through the regular Tool
// trait so the runner can call it like a function tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::tools::{Tool, ToolExecutionResult};

mod analysis;
mod api;
mod csv;
mod database;
mod json;
mod visualization;

pub use analysis::{PatternTool, StatisticsTool, TextAnalysisTool};
pub use api::{ApiTool, CacheTool, MockResponse, RateLimiter, RateLimiterTool, ResponseCache};
pub use csv::CsvTool;
pub use database::{DatabaseTool, MockDatabase};
pub use json::JsonTool;
pub use visualization::VisualizationTool;

/// Outcome of an operation tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    /// Completed but reported as unsuccessful, with data attached
    pub fn unsuccessful(data: impl Into<Value>) -> Self {
        Self {
            success: false,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "success": self.success,
            "data": self.data,
            "error": self.error,
        })
    }
}

/// Errors raised while running an operation
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{0}")]
    Failed(String),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed(message.into())
    }
}

pub type OperationOutcome = std::result::Result<OperationResult, OperationError>;

/// Trait for multi-operation tools
#[async_trait]
pub trait OperationTool: Send + Sync {
    /// Tool name advertised to the model
    fn name(&self) -> &str;

    /// Human label used in failure messages ("Error executing {kind} tool: ...")
    fn kind(&self) -> &str;

    fn description(&self) -> &str;

    /// Supported operation names
    fn operations(&self) -> &'static [&'static str];

    /// Argument properties merged into the adapter's JSON schema
    fn argument_properties(&self) -> Value {
        json!({})
    }

    /// Check that the operation is known and its required arguments exist
    fn validate_input(&self, input: &Value) -> bool;

    /// Run one operation
    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome;

    /// Dispatch on `operation` and map errors into an OperationResult
    async fn execute(&self, input: Value) -> OperationResult {
        let operation = input
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match self.run(&operation, &input).await {
            Ok(result) => result,
            Err(err @ OperationError::UnknownOperation(_)) => {
                OperationResult::failure(err.to_string())
            }
            Err(OperationError::Failed(message)) => OperationResult::failure(format!(
                "Error executing {} tool: {}",
                self.kind(),
                message
            )),
        }
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

pub(crate) fn operation_of(input: &Value) -> Option<&str> {
    input.get("operation").and_then(Value::as_str)
}

pub(crate) fn has(input: &Value, key: &str) -> bool {
    input.get(key).is_some()
}

pub(crate) fn has_array(input: &Value, key: &str) -> bool {
    input.get(key).map(Value::is_array).unwrap_or(false)
}

pub(crate) fn has_str(input: &Value, key: &str) -> bool {
    input.get(key).map(Value::is_string).unwrap_or(false)
}

pub(crate) fn str_arg<'a>(input: &'a Value, key: &str) -> Result<&'a str, OperationError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| OperationError::failed(format!("'{}' must be a string", key)))
}

pub(crate) fn array_arg<'a>(input: &'a Value, key: &str) -> Result<&'a Vec<Value>, OperationError> {
    input
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| OperationError::failed(format!("'{}' must be a list", key)))
}

pub(crate) fn numbers_arg(input: &Value, key: &str) -> Result<Vec<f64>, OperationError> {
    array_arg(input, key)?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| OperationError::failed(format!("'{}' must contain only numbers", key)))
        })
        .collect()
}

// ============================================================================
// Adapter
// ============================================================================

/// Exposes an OperationTool as a Tool
pub struct OperationToolAdapter<T: ?Sized> {
    inner: Arc<T>,
}

impl<T: OperationTool + ?Sized> OperationToolAdapter<T> {
    pub fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: OperationTool + ?Sized + 'static> Tool for OperationToolAdapter<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            "operation".to_string(),
            json!({
                "type": "string",
                "enum": self.inner.operations(),
                "description": "Operation to perform"
            }),
        );
        if let Value::Object(extra) = self.inner.argument_properties() {
            properties.extend(extra);
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": ["operation"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        if !self.inner.validate_input(&arguments) {
            return ToolExecutionResult::success(
                OperationResult::failure(format!("Invalid input for {}", self.inner.name()))
                    .to_value(),
            );
        }
        ToolExecutionResult::success(self.inner.execute(arguments).await.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_adapter_rejects_invalid_input() {
        let adapter = OperationToolAdapter::new(Arc::new(JsonTool));
        let result = adapter.execute(json!({"operation": "validate"})).await;
        match result {
            ToolExecutionResult::Success(v) => {
                assert_eq!(v["success"], json!(false));
                assert_eq!(v["error"], json!("Invalid input for json_tool"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_adapter_schema_lists_operations() {
        let adapter = OperationToolAdapter::new(Arc::new(CsvTool));
        let schema = adapter.parameters_schema();
        assert_eq!(schema["properties"]["operation"]["enum"], json!(["parse", "generate"]));
        assert_eq!(schema["required"], json!(["operation"]));
    }

    #[tokio::test]
    async fn test_unknown_operation_message() {
        let result = JsonTool.execute(json!({"operation": "explode"})).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown operation: explode"));
    }
}
