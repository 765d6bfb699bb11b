//! Math Capability - arithmetic tools

use super::{Capability, CapabilityId};
use crate::tools::{required_f64, Tool, ToolExecutionResult};
use async_trait::async_trait;
use serde_json::Value;

/// Math capability - add and multiply
pub struct MathCapability;

impl Capability for MathCapability {
    fn id(&self) -> &str {
        CapabilityId::MATH
    }

    fn name(&self) -> &str {
        "Math"
    }

    fn description(&self) -> &str {
        "Adds calculator tools (add, multiply)."
    }

    fn system_prompt_addition(&self) -> Option<&str> {
        Some("You have access to math tools. Use them for calculations instead of computing in your head.")
    }

    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![Box::new(AddTool), Box::new(MultiplyTool)]
    }
}

fn two_numbers_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "a": { "type": "number", "description": "The first number" },
            "b": { "type": "number", "description": "The second number" }
        },
        "required": ["a", "b"],
        "additionalProperties": false
    })
}

// ============================================================================
// Tool: add
// ============================================================================

/// Tool that adds two numbers
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers together and return the sum."
    }

    fn parameters_schema(&self) -> Value {
        two_numbers_schema()
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let a = match required_f64(&arguments, "a") {
            Ok(v) => v,
            Err(e) => return e,
        };
        let b = match required_f64(&arguments, "b") {
            Ok(v) => v,
            Err(e) => return e,
        };
        ToolExecutionResult::success(a + b)
    }
}

// ============================================================================
// Tool: multiply
// ============================================================================

/// Tool that multiplies two numbers
pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two numbers and return the product."
    }

    fn parameters_schema(&self) -> Value {
        two_numbers_schema()
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let a = match required_f64(&arguments, "a") {
            Ok(v) => v,
            Err(e) => return e,
        };
        let b = match required_f64(&arguments, "b") {
            Ok(v) => v,
            Err(e) => return e,
        };
        ToolExecutionResult::success(a * b)
    }
}
