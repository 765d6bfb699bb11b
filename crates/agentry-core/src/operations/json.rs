//! JSON validation and template-driven transformation

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{has, operation_of, OperationError, OperationOutcome, OperationResult, OperationTool};

pub struct JsonTool;

/// Validate that `data` is a JSON object
pub fn validate_json(data: &Value) -> Value {
    if data.is_object() {
        json!({ "is_valid": true, "errors": null })
    } else {
        json!({ "is_valid": false, "errors": ["Input is not a valid JSON object"] })
    }
}

/// Project `data` through `template`.
///
/// Only template keys present in `data` are emitted. A string template value
/// `"$other"` pulls `data["other"]` instead (skipped when absent); nested
/// object templates recurse into nested object data.
pub fn transform_json(data: &Map<String, Value>, template: &Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();

    for (key, template_value) in template {
        let Some(data_value) = data.get(key) else {
            continue;
        };

        if let Some(reference) = template_value.as_str().and_then(|s| s.strip_prefix('$')) {
            if let Some(referenced) = data.get(reference) {
                result.insert(key.clone(), referenced.clone());
            }
            continue;
        }

        match (template_value, data_value) {
            (Value::Object(nested_template), Value::Object(nested_data)) => {
                result.insert(
                    key.clone(),
                    Value::Object(transform_json(nested_data, nested_template)),
                );
            }
            _ => {
                result.insert(key.clone(), data_value.clone());
            }
        }
    }

    result
}

#[async_trait]
impl OperationTool for JsonTool {
    fn name(&self) -> &str {
        "json_tool"
    }

    fn kind(&self) -> &str {
        "JSON"
    }

    fn description(&self) -> &str {
        "Processes JSON data with operations like validation and transformation. Operations: validate, transform."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["validate", "transform"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "data": { "description": "JSON data to process" },
            "template": { "type": "object", "description": "Output template for transform" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("validate") => has(input, "data"),
            Some("transform") => has(input, "data") && has(input, "template"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "validate" => {
                let data = input.get("data").unwrap_or(&Value::Null);
                Ok(OperationResult::ok(validate_json(data)))
            }
            "transform" => {
                let data = input
                    .get("data")
                    .and_then(Value::as_object)
                    .ok_or_else(|| OperationError::failed("'data' must be an object"))?;
                let template = input
                    .get("template")
                    .and_then(Value::as_object)
                    .ok_or_else(|| OperationError::failed("'template' must be an object"))?;
                Ok(OperationResult::ok(Value::Object(transform_json(data, template))))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_json() {
        assert_eq!(validate_json(&json!({"a": 1}))["is_valid"], json!(true));
        let invalid = validate_json(&json!([1, 2]));
        assert_eq!(invalid["is_valid"], json!(false));
        assert_eq!(invalid["errors"][0], json!("Input is not a valid JSON object"));
    }

    #[tokio::test]
    async fn test_transform_with_ref_and_nesting() {
        let result = JsonTool
            .execute(json!({
                "operation": "transform",
                "data": {
                    "name": "Ada",
                    "alias": "Countess",
                    "address": {"city": "London", "zip": "N1"},
                    "ignored": true
                },
                "template": {
                    "name": "$alias",
                    "address": {"city": ""},
                    "missing": "x"
                }
            }))
            .await;

        assert!(result.success);
        assert_eq!(
            result.data,
            Some(json!({"name": "Countess", "address": {"city": "London"}}))
        );
    }

    #[test]
    fn test_reference_to_missing_field_is_skipped() {
        let data = json!({"name": "n", "title": "t"});
        let template = json!({"name": "$nickname", "title": "$name"});
        let result = transform_json(
            data.as_object().unwrap(),
            template.as_object().unwrap(),
        );
        assert_eq!(Value::Object(result), json!({"title": "n"}));
    }

    #[test]
    fn test_plain_string_template_copies_data() {
        let data = json!({"name": "n", "alias": "A"});
        let template = json!({"name": "alias"});
        let result = transform_json(
            data.as_object().unwrap(),
            template.as_object().unwrap(),
        );
        assert_eq!(result["name"], json!("n"));
    }

    #[tokio::test]
    async fn test_transform_requires_object_data() {
        let result = JsonTool
            .execute(json!({"operation": "transform", "data": [1], "template": {}}))
            .await;
        assert!(!result.success);
        assert!(result
            .error
            .unwrap()
            .starts_with("Error executing JSON tool:"));
    }
}
