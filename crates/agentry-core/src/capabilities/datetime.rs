//! DateTime Capability - current time and date arithmetic

use super::{Capability, CapabilityId};
use crate::tools::{required_i64, required_str, Tool, ToolExecutionResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub struct DateTimeCapability;

impl Capability for DateTimeCapability {
    fn id(&self) -> &str {
        CapabilityId::DATETIME
    }

    fn name(&self) -> &str {
        "Date & Time"
    }

    fn description(&self) -> &str {
        "Adds tools to read the current UTC time and shift dates by a number of days."
    }

    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![Box::new(CurrentTimeTool), Box::new(AddDaysTool)]
    }
}

// ============================================================================
// Tool: current_time
// ============================================================================

/// Tool that returns the current UTC time (RFC 3339)
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current UTC date and time in ISO 8601 format."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, _arguments: Value) -> ToolExecutionResult {
        ToolExecutionResult::success(chrono::Utc::now().to_rfc3339())
    }
}

// ============================================================================
// Tool: add_days
// ============================================================================

/// Tool that adds a number of days to a date
pub struct AddDaysTool;

/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS` or RFC 3339
fn parse_base_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

#[async_trait]
impl Tool for AddDaysTool {
    fn name(&self) -> &str {
        "add_days"
    }

    fn description(&self) -> &str {
        "Add a number of days to an ISO date and return the resulting date (YYYY-MM-DD)."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "base_date": { "type": "string", "description": "ISO date or datetime" },
                "days": { "type": "integer", "description": "Days to add (may be negative)" }
            },
            "required": ["base_date", "days"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let base_date = match required_str(&arguments, "base_date") {
            Ok(s) => s,
            Err(e) => return e,
        };
        let days = match required_i64(&arguments, "days") {
            Ok(d) => d,
            Err(e) => return e,
        };

        let Some(date) = parse_base_date(base_date) else {
            return ToolExecutionResult::tool_error(format!(
                "Invalid date format: {}",
                base_date
            ));
        };

        match date.checked_add_signed(Duration::days(days)) {
            Some(result) => ToolExecutionResult::success(result.format("%Y-%m-%d").to_string()),
            None => ToolExecutionResult::tool_error("Resulting date is out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_current_time_is_rfc3339() {
        match CurrentTimeTool.execute(json!({})).await {
            ToolExecutionResult::Success(Value::String(s)) => {
                assert!(DateTime::parse_from_rfc3339(&s).is_ok())
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_days_across_month() {
        let result = AddDaysTool
            .execute(json!({"base_date": "2024-01-30", "days": 3}))
            .await;
        match result {
            ToolExecutionResult::Success(v) => assert_eq!(v, json!("2024-02-02")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_days_accepts_datetime() {
        let result = AddDaysTool
            .execute(json!({"base_date": "2024-03-01T10:00:00", "days": -1}))
            .await;
        match result {
            ToolExecutionResult::Success(v) => assert_eq!(v, json!("2024-02-29")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_days_rejects_garbage() {
        let result = AddDaysTool
            .execute(json!({"base_date": "yesterday", "days": 1}))
            .await;
        assert!(matches!(result, ToolExecutionResult::ToolError(msg) if msg.contains("yesterday")));
    }
}
