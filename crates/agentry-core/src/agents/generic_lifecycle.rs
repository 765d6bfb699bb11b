// Generic lifecycle agent
//
// A configurable agent whose run is bracketed by lifecycle hooks. Logging
// hooks are used unless the caller supplies its own.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::capabilities::{
    AddTool, CurrentTimeTool, EchoTool, FetchMockDataTool, MultiplyTool, ToUppercaseTool,
};
use crate::error::Result;
use crate::hooks::{LoggingHooks, RunHooks};
use crate::runner::{Agent, RunResult, Runner};
use crate::tools::ToolRegistry;

use super::SharedProvider;

static SOURCE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[Ff]rom\s+'([^']+)'").ok());

const DEFAULT_INSTRUCTIONS: &str = "You have access to the following INTERNAL tools only:\n\
- echo(message: str): echoes a message.\n\
- add(a: float, b: float): returns the sum of two numbers.\n\
- multiply(a: float, b: float): returns the product of two numbers.\n\
- to_uppercase(text: str): converts text to uppercase.\n\
- current_time(): returns current UTC time.\n\
- fetch_mock_data(source: str): retrieves MOCK data from a simulated internal database.\n\n\
When a user requests to fetch or retrieve data from any source, use fetch_mock_data to get the data \
and return the data value from the result.";

#[derive(Clone)]
pub struct GenericAgentConfig {
    pub name: String,
    pub instructions: String,
    pub tools: ToolRegistry,
    /// Free-form description of the expected answer shape
    pub output_type: Option<String>,
}

impl GenericAgentConfig {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: ToolRegistry::new(),
            output_type: None,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = Some(output_type.into());
        self
    }
}

impl Default for GenericAgentConfig {
    /// Agent with echo, add, multiply, to_uppercase, current_time and fetch_mock_data
    fn default() -> Self {
        Self::new("GenericLifecycleAgent", DEFAULT_INSTRUCTIONS).with_tools(
            ToolRegistry::builder()
                .tool(EchoTool)
                .tool(AddTool)
                .tool(MultiplyTool)
                .tool(ToUppercaseTool)
                .tool(CurrentTimeTool)
                .tool(FetchMockDataTool)
                .build(),
        )
    }
}

pub struct GenericLifecycleAgent {
    agent: Agent,
    runner: Runner<SharedProvider>,
    hooks: Arc<dyn RunHooks>,
}

impl GenericLifecycleAgent {
    pub fn new(config: GenericAgentConfig, provider: SharedProvider, model: &str) -> Self {
        let mut instructions = config.instructions;
        if let Some(output_type) = &config.output_type {
            instructions.push_str(&format!("\n\nFormat the final answer as: {}", output_type));
        }

        Self {
            agent: Agent::new(config.name, instructions)
                .with_model(model)
                .with_tools(config.tools),
            runner: Runner::new(provider),
            hooks: Arc::new(LoggingHooks::new()),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub async fn run(&self, message: &str) -> Result<RunResult> {
        let lower = message.to_lowercase();
        if lower.contains("fetch") || lower.contains("retrieve") {
            let source = SOURCE_PATTERN
                .as_ref()
                .and_then(|re| re.captures(message))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .unwrap_or("unknown");
            debug!(source = %source, "Data retrieval requested");
        }

        self.runner
            .run(&self.agent, message, self.hooks.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use serde_json::json;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_default_config_tools() {
        let config = GenericAgentConfig::default();
        assert_eq!(
            config.tools.list_available_tools(),
            vec![
                "add",
                "current_time",
                "echo",
                "fetch_mock_data",
                "multiply",
                "to_uppercase"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_with_capturing_hooks() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call(
                "c1",
                "fetch_mock_data",
                json!({"source": "inventory"}),
            ),
            ScriptedResponse::text("sample data"),
        ]);
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let agent = GenericLifecycleAgent::new(
            GenericAgentConfig::default(),
            Arc::new(provider),
            "gpt-4o-mini",
        )
        .with_hooks(Arc::new(LoggingHooks::capturing(buffer.clone())));

        let result = agent
            .run("Fetch the data from 'inventory'")
            .await
            .unwrap();
        assert_eq!(result.final_output, "sample data");

        let lines = buffer.lock().await.clone();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "[TOOL START] 'fetch_mock_data' started.");
    }

    #[test]
    fn test_output_type_appended() {
        let config = GenericAgentConfig::new("Typed", "Answer briefly").with_output_type("a JSON object");
        let agent = GenericLifecycleAgent::new(
            config,
            Arc::new(ScriptedLlmProvider::new()),
            "gpt-4o-mini",
        );
        assert!(agent
            .agent()
            .instructions
            .ends_with("Format the final answer as: a JSON object"));
    }
}
