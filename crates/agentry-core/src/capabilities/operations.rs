//! Operations Capability - multi-operation data tools sharing in-process state

use std::sync::Arc;

use super::{Capability, CapabilityId};
use crate::operations::{
    ApiTool, CacheTool, CsvTool, DatabaseTool, JsonTool, MockDatabase, OperationToolAdapter,
    PatternTool, RateLimiter, RateLimiterTool, ResponseCache, StatisticsTool, TextAnalysisTool,
    VisualizationTool,
};
use crate::tools::Tool;

/// Operation tools; every `tools()` call shares one database, cache and limiter
#[derive(Debug, Clone, Default)]
pub struct OperationsCapability {
    db: MockDatabase,
    cache: ResponseCache,
    limiter: RateLimiter,
}

impl Capability for OperationsCapability {
    fn id(&self) -> &str {
        CapabilityId::OPERATIONS
    }

    fn name(&self) -> &str {
        "Operations"
    }

    fn description(&self) -> &str {
        "Adds JSON, CSV, database, analysis, API, cache, rate limiter and visualization tools."
    }

    fn system_prompt_addition(&self) -> Option<&str> {
        Some("Operation tools take an `operation` argument naming what to do, plus that operation's arguments.")
    }

    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(OperationToolAdapter::new(Arc::new(JsonTool))),
            Box::new(OperationToolAdapter::new(Arc::new(CsvTool))),
            Box::new(OperationToolAdapter::new(Arc::new(DatabaseTool::new(
                self.db.clone(),
            )))),
            Box::new(OperationToolAdapter::new(Arc::new(TextAnalysisTool))),
            Box::new(OperationToolAdapter::new(Arc::new(StatisticsTool))),
            Box::new(OperationToolAdapter::new(Arc::new(PatternTool))),
            Box::new(OperationToolAdapter::new(Arc::new(ApiTool::new(
                self.limiter.clone(),
            )))),
            Box::new(OperationToolAdapter::new(Arc::new(CacheTool::new(
                self.cache.clone(),
            )))),
            Box::new(OperationToolAdapter::new(Arc::new(RateLimiterTool::new(
                self.limiter.clone(),
            )))),
            Box::new(OperationToolAdapter::new(Arc::new(VisualizationTool))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolExecutionResult, ToolRegistry};
    use serde_json::json;

    #[tokio::test]
    async fn test_tools_share_database() {
        let capability = OperationsCapability::default();
        let mut first = ToolRegistry::new();
        for tool in capability.tools() {
            first.register_boxed(tool);
        }
        let mut second = ToolRegistry::new();
        for tool in capability.tools() {
            second.register_boxed(tool);
        }
        assert_eq!(first.len(), 10);

        let store = first.get("database_tool").unwrap();
        store
            .execute(json!({"operation": "store", "key": "a", "value": 42}))
            .await;

        let read = second.get("database_tool").unwrap();
        match read.execute(json!({"operation": "retrieve", "key": "a"})).await {
            ToolExecutionResult::Success(v) => assert_eq!(v["data"], json!(42)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
