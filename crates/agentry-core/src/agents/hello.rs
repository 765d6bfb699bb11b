// Hello agent: a single greeting tool

use crate::capabilities::HelloWorldTool;
use crate::hooks::NoopHooks;
use crate::runner::{Agent, Runner};
use crate::tools::ToolRegistry;

use super::{error_text, SharedProvider};

pub struct HelloAgent {
    agent: Agent,
    runner: Runner<SharedProvider>,
}

impl HelloAgent {
    pub fn new(provider: SharedProvider, model: impl Into<String>) -> Self {
        let agent = Agent::new(
            "HelloAgent",
            "You are a friendly agent that greets the user.",
        )
        .with_model(model)
        .with_tools(ToolRegistry::builder().tool(HelloWorldTool).build());

        Self {
            agent,
            runner: Runner::new(provider),
        }
    }

    /// Final output of the run, or an `Error: ...` string
    pub async fn run_hello_agent(&self, message: &str) -> String {
        match self.runner.run(&self.agent, message, &NoopHooks).await {
            Ok(result) if !result.final_output.is_empty() => result.final_output,
            Ok(_) => "Error: No response from agent.".to_string(),
            Err(e) => error_text(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hello_agent_calls_tool() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("call_1", "hello_world_tool", json!({})),
            ScriptedResponse::text("Hello, world! Nice to meet you."),
        ]);
        let agent = HelloAgent::new(Arc::new(provider.clone()), "gpt-4o-mini");

        let output = agent.run_hello_agent("hi").await;
        assert_eq!(output, "Hello, world! Nice to meet you.");

        let calls = provider.calls().await;
        assert_eq!(calls[1].messages.last().unwrap().content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_hello_agent_reports_errors() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::error("offline")]);
        let agent = HelloAgent::new(Arc::new(provider), "gpt-4o-mini");

        let output = agent.run_hello_agent("hi").await;
        assert!(output.starts_with("Error: "));
        assert!(output.contains("offline"));
    }
}
