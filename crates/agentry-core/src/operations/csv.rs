//! CSV parsing and generation (RFC 4180 quoting)

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{
    array_arg, has, has_array, operation_of, str_arg, OperationError, OperationOutcome,
    OperationResult, OperationTool,
};

pub struct CsvTool;

/// Split CSV text into records of fields.
///
/// Handles quoted fields containing commas, doubled quotes and line breaks.
fn read_records(content: &str) -> Result<Vec<Vec<String>>, OperationError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                field_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if field_started || !field.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            _ => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err(OperationError::failed(
            "Error parsing CSV: unexpected end of data inside quoted field",
        ));
    }
    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// Parse CSV text into a list of row objects
pub fn parse_csv(content: &str, has_header: bool) -> Result<Vec<Value>, OperationError> {
    let records = read_records(content)?;

    if !has_header {
        return Ok(records
            .into_iter()
            .map(|row| {
                let object: Map<String, Value> = row
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| (format!("column_{}", i), Value::String(value)))
                    .collect();
                Value::Object(object)
            })
            .collect());
    }

    let mut rows = records.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    Ok(rows
        .map(|row| {
            let mut object = Map::new();
            for (i, name) in header.iter().enumerate() {
                let value = row.get(i).cloned().map(Value::String).unwrap_or(Value::Null);
                object.insert(name.clone(), value);
            }
            Value::Object(object)
        })
        .collect())
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render row objects as CSV; columns come from the first row
pub fn generate_csv(data: &[Value], include_header: bool) -> Result<String, OperationError> {
    let Some(first) = data.first() else {
        return Ok(String::new());
    };
    let columns: Vec<String> = first
        .as_object()
        .ok_or_else(|| OperationError::failed("rows must be objects"))?
        .keys()
        .cloned()
        .collect();

    let mut output = String::new();
    if include_header {
        let header: Vec<String> = columns.iter().map(|c| quote_field(c)).collect();
        output.push_str(&header.join(","));
        output.push_str("\r\n");
    }

    for row in data {
        let row = row
            .as_object()
            .ok_or_else(|| OperationError::failed("rows must be objects"))?;
        if let Some(extra) = row.keys().find(|k| !columns.contains(k)) {
            return Err(OperationError::failed(format!(
                "dict contains fields not in fieldnames: '{}'",
                extra
            )));
        }
        let cells: Vec<String> = columns
            .iter()
            .map(|c| quote_field(&cell_text(row.get(c))))
            .collect();
        output.push_str(&cells.join(","));
        output.push_str("\r\n");
    }

    Ok(output)
}

#[async_trait]
impl OperationTool for CsvTool {
    fn name(&self) -> &str {
        "csv_tool"
    }

    fn kind(&self) -> &str {
        "CSV"
    }

    fn description(&self) -> &str {
        "Processes CSV data with operations like parsing and generation. Operations: parse, generate."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["parse", "generate"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "content": { "type": "string", "description": "CSV text to parse" },
            "has_header": { "type": "boolean", "description": "First row is a header (default true)" },
            "data": { "type": "array", "items": { "type": "object" }, "description": "Rows to render" },
            "include_header": { "type": "boolean", "description": "Emit a header row (default true)" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("parse") => has(input, "content"),
            Some("generate") => has_array(input, "data"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "parse" => {
                let content = str_arg(input, "content")?;
                let has_header = input
                    .get("has_header")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                Ok(OperationResult::ok(parse_csv(content, has_header)?))
            }
            "generate" => {
                let data = array_arg(input, "data")?;
                let include_header = input
                    .get("include_header")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                Ok(OperationResult::ok(generate_csv(data, include_header)?))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}
