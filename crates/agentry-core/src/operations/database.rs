//! Mock key/value database tool

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{has, operation_of, str_arg, OperationError, OperationOutcome, OperationResult, OperationTool};

/// Shared in-memory store backing DatabaseTool
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    entries: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, key: &str, value: Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    pub async fn retrieve(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

pub struct DatabaseTool {
    db: MockDatabase,
}

impl DatabaseTool {
    pub fn new(db: MockDatabase) -> Self {
        Self { db }
    }
}

impl Default for DatabaseTool {
    fn default() -> Self {
        Self::new(MockDatabase::new())
    }
}

#[async_trait]
impl OperationTool for DatabaseTool {
    fn name(&self) -> &str {
        "database_tool"
    }

    fn kind(&self) -> &str {
        "database"
    }

    fn description(&self) -> &str {
        "Performs mock database operations for storing and retrieving data. Operations: store, retrieve, list, delete, clear."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["store", "retrieve", "list", "delete", "clear"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "key": { "type": "string", "description": "Record key" },
            "value": { "description": "Value to store" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("store") => has(input, "key") && has(input, "value"),
            Some("retrieve") | Some("delete") => has(input, "key"),
            Some("list") | Some("clear") => true,
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "store" => {
                let key = str_arg(input, "key")?;
                let value = input.get("value").cloned().unwrap_or(Value::Null);
                self.db.store(key, value).await;
                Ok(OperationResult::ok(json!({ "stored": true })))
            }
            "retrieve" => {
                let key = str_arg(input, "key")?;
                Ok(OperationResult::ok(
                    self.db.retrieve(key).await.unwrap_or(Value::Null),
                ))
            }
            "list" => Ok(OperationResult::ok(self.db.keys().await)),
            "delete" => {
                let key = str_arg(input, "key")?;
                let deleted = self.db.delete(key).await;
                let data = json!({ "deleted": deleted });
                Ok(if deleted {
                    OperationResult::ok(data)
                } else {
                    OperationResult::unsuccessful(data)
                })
            }
            "clear" => {
                self.db.clear().await;
                Ok(OperationResult::ok(json!({ "cleared": true })))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_list_delete() {
        let tool = DatabaseTool::default();

        let stored = tool
            .execute(json!({"operation": "store", "key": "user:1", "value": {"name": "Ada"}}))
            .await;
        assert_eq!(stored.data, Some(json!({"stored": true})));

        let fetched = tool
            .execute(json!({"operation": "retrieve", "key": "user:1"}))
            .await;
        assert_eq!(fetched.data, Some(json!({"name": "Ada"})));

        let listed = tool.execute(json!({"operation": "list"})).await;
        assert_eq!(listed.data, Some(json!(["user:1"])));

        let deleted = tool
            .execute(json!({"operation": "delete", "key": "user:1"}))
            .await;
        assert!(deleted.success);

        let again = tool
            .execute(json!({"operation": "delete", "key": "user:1"}))
            .await;
        assert!(!again.success);
        assert_eq!(again.data, Some(json!({"deleted": false})));
    }

    #[tokio::test]
    async fn test_shared_store_between_tools() {
        let db = MockDatabase::new();
        let writer = DatabaseTool::new(db.clone());
        let reader = DatabaseTool::new(db);

        writer
            .execute(json!({"operation": "store", "key": "k", "value": 1}))
            .await;
        let result = reader
            .execute(json!({"operation": "retrieve", "key": "k"}))
            .await;
        assert_eq!(result.data, Some(json!(1)));

        reader.execute(json!({"operation": "clear"})).await;
        let missing = writer
            .execute(json!({"operation": "retrieve", "key": "k"}))
            .await;
        assert_eq!(missing.data, Some(Value::Null));
    }

    #[test]
    fn test_validate_input() {
        let tool = DatabaseTool::default();
        assert!(tool.validate_input(&json!({"operation": "list"})));
        assert!(!tool.validate_input(&json!({"operation": "store", "key": "k"})));
        assert!(!tool.validate_input(&json!({"operation": "drop"})));
    }
}
