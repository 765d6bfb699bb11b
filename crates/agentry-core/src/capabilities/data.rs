//! Data Capability - list helpers and mock data source

use super::{Capability, CapabilityId};
use crate::tools::{required_array, required_i64, required_str, Tool, ToolExecutionResult};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct DataCapability;

impl Capability for DataCapability {
    fn id(&self) -> &str {
        CapabilityId::DATA
    }

    fn name(&self) -> &str {
        "Data"
    }

    fn description(&self) -> &str {
        "Adds list helpers (get_item, summarize_list) and a mock data source (fetch_mock_data)."
    }

    fn system_prompt_addition(&self) -> Option<&str> {
        Some("When a user asks to fetch or retrieve data from any source, call fetch_mock_data and return the data value from the result.")
    }

    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(GetItemTool),
            Box::new(SummarizeListTool),
            Box::new(FetchMockDataTool),
        ]
    }
}

// ============================================================================
// Tool: get_item
// ============================================================================

pub struct GetItemTool;

#[async_trait]
impl Tool for GetItemTool {
    fn name(&self) -> &str {
        "get_item"
    }

    fn description(&self) -> &str {
        "Return the list element at the given index, or null when out of range."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "items": { "type": "array", "items": {}, "description": "The list" },
                "index": { "type": "integer", "description": "Zero-based index" }
            },
            "required": ["items", "index"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let items = match required_array(&arguments, "items") {
            Ok(items) => items,
            Err(e) => return e,
        };
        let index = match required_i64(&arguments, "index") {
            Ok(i) => i,
            Err(e) => return e,
        };

        let item = usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null);
        ToolExecutionResult::success(item)
    }
}

// ============================================================================
// Tool: summarize_list
// ============================================================================

pub struct SummarizeListTool;

#[async_trait]
impl Tool for SummarizeListTool {
    fn name(&self) -> &str {
        "summarize_list"
    }

    fn description(&self) -> &str {
        "Summarize a list: its length and first item."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "items": { "type": "array", "items": {}, "description": "The list" }
            },
            "required": ["items"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let items = match required_array(&arguments, "items") {
            Ok(items) => items,
            Err(e) => return e,
        };
        ToolExecutionResult::success(json!({
            "length": items.len(),
            "first_item": items.first().cloned().unwrap_or(Value::Null),
        }))
    }
}

// ============================================================================
// Tool: fetch_mock_data
// ============================================================================

pub struct FetchMockDataTool;

#[async_trait]
impl Tool for FetchMockDataTool {
    fn name(&self) -> &str {
        "fetch_mock_data"
    }

    fn description(&self) -> &str {
        "Retrieve MOCK data from a simulated internal database."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "source": { "type": "string", "description": "Name of the data source" }
            },
            "required": ["source"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "source") {
            Ok(source) => ToolExecutionResult::success(json!({
                "source": source,
                "data": "sample data",
            })),
            Err(e) => e,
        }
    }
}
