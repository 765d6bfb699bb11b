// Run lifecycle hooks
//
// The runner calls these around the agent run and every tool invocation.
// All methods default to no-ops so implementations override what they need.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::runner::Agent;

#[async_trait]
pub trait RunHooks: Send + Sync {
    async fn on_agent_start(&self, _agent: &Agent) {}

    async fn on_agent_end(&self, _agent: &Agent, _output: &str) {}

    async fn on_tool_start(&self, _agent: &Agent, _tool_name: &str) {}

    async fn on_tool_end(&self, _agent: &Agent, _tool_name: &str, _result: &str) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl RunHooks for NoopHooks {}

pub fn agent_start_line(agent: &Agent) -> String {
    format!("[START] Agent '{}' started.", agent.name)
}

pub fn agent_end_line(agent: &Agent, output: &str) -> String {
    format!("[END] Agent '{}' ended with output: {}", agent.name, output)
}

pub fn tool_start_line(tool_name: &str) -> String {
    format!("[TOOL START] '{}' started.", tool_name)
}

pub fn tool_end_line(tool_name: &str, result: &str) -> String {
    format!("[TOOL END] '{}' ended with result: {}", tool_name, result)
}

/// Logs every lifecycle event at info level.
///
/// Lines can also be captured into a shared buffer, which is how callers
/// surface the run transcript.
#[derive(Debug, Clone, Default)]
pub struct LoggingHooks {
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

impl LoggingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append every line to `buffer`
    pub fn capturing(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            captured: Some(buffer),
        }
    }

    async fn emit(&self, line: String) {
        info!("{}", line);
        if let Some(buffer) = &self.captured {
            buffer.lock().await.push(line);
        }
    }
}

#[async_trait]
impl RunHooks for LoggingHooks {
    async fn on_agent_start(&self, agent: &Agent) {
        self.emit(agent_start_line(agent)).await;
    }

    async fn on_agent_end(&self, agent: &Agent, output: &str) {
        self.emit(agent_end_line(agent, output)).await;
    }

    async fn on_tool_start(&self, _agent: &Agent, tool_name: &str) {
        self.emit(tool_start_line(tool_name)).await;
    }

    async fn on_tool_end(&self, _agent: &Agent, tool_name: &str, result: &str) {
        self.emit(tool_end_line(tool_name, result)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_hooks_capture_lines() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let hooks = LoggingHooks::capturing(buffer.clone());
        let agent = Agent::new("Greeter", "Say hi");

        hooks.on_agent_start(&agent).await;
        hooks.on_tool_start(&agent, "echo").await;
        hooks.on_tool_end(&agent, "echo", "Echo: hi").await;
        hooks.on_agent_end(&agent, "done").await;

        let lines = buffer.lock().await.clone();
        assert_eq!(
            lines,
            vec![
                "[START] Agent 'Greeter' started.",
                "[TOOL START] 'echo' started.",
                "[TOOL END] 'echo' ended with result: Echo: hi",
                "[END] Agent 'Greeter' ended with output: done",
            ]
        );
    }
}
