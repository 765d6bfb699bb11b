//! Mock chart generation

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{
    array_arg, has_array, operation_of, OperationError, OperationOutcome, OperationResult,
    OperationTool,
};

pub struct VisualizationTool;

fn chart(chart_type: &str, title: Option<&str>) -> Value {
    let chart_id = Uuid::new_v4().to_string();
    json!({
        "url": format!("mock://charts/{}/{}", chart_type, chart_id),
        "chart_id": chart_id,
        "type": chart_type,
        "title": title,
    })
}

#[async_trait]
impl OperationTool for VisualizationTool {
    fn name(&self) -> &str {
        "visualization_tool"
    }

    fn kind(&self) -> &str {
        "visualization"
    }

    fn description(&self) -> &str {
        "Creates mock data visualizations. Operations: bar, line, pie, scatter."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["bar", "line", "pie", "scatter"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "data": { "type": "array", "items": { "type": "object" } },
            "x_data": { "type": "array", "items": { "type": "number" } },
            "y_data": { "type": "array", "items": { "type": "number" } },
            "title": { "type": "string" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("bar") | Some("line") | Some("pie") => has_array(input, "data"),
            Some("scatter") => has_array(input, "x_data") && has_array(input, "y_data"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        let title = input.get("title").and_then(Value::as_str);
        match operation {
            "bar" | "line" | "pie" => {
                array_arg(input, "data")?;
                Ok(OperationResult::ok(chart(operation, title)))
            }
            "scatter" => {
                let x = array_arg(input, "x_data")?;
                let y = array_arg(input, "y_data")?;
                if x.len() != y.len() {
                    return Err(OperationError::failed(
                        "x_data and y_data must have the same length",
                    ));
                }
                Ok(OperationResult::ok(chart("scatter", title)))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}
