// Run context storage
//
// Key/value bag that agents and hooks use to share data across a run.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct ContextManager {
    entries: Map<String, Value>,
}

impl ContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one
    pub fn store(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value for `key`, or `default` when absent
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.entries.get(key).cloned().unwrap_or(default)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of every entry
    pub fn get_all(&self) -> Map<String, Value> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_get_and_default() {
        let mut ctx = ContextManager::new();
        ctx.store("user", "ada");
        ctx.store("attempts", 2);

        assert_eq!(ctx.get("user"), Some(&json!("ada")));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.get_or("missing", json!({})), json!({}));
        assert_eq!(ctx.get_or("attempts", json!(0)), json!(2));
    }

    #[test]
    fn test_get_all_is_a_copy() {
        let mut ctx = ContextManager::new();
        ctx.store("a", 1);
        let mut snapshot = ctx.get_all();
        snapshot.insert("b".to_string(), json!(2));

        assert_eq!(ctx.len(), 1);
        ctx.clear();
        assert!(ctx.is_empty());
        assert_eq!(snapshot.len(), 2);
    }
}
