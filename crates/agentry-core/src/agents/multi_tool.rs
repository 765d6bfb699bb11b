// Multi-tool agent with state tracking
//
// Every run gets its own ContextManager and StateMachine. The hooks move the
// state machine through the run and record tool results into the context,
// which is returned alongside the final output.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::capabilities::{
    AddTool, CurrentTimeTool, EchoTool, FetchMockDataTool, MultiplyTool, ToUppercaseTool,
};
use crate::context::ContextManager;
use crate::hooks::{agent_end_line, agent_start_line, tool_end_line, tool_start_line, RunHooks};
use crate::runner::{Agent, Runner, DEFAULT_MAX_ITERATIONS};
use crate::state::{AgentState, StateMachine};
use crate::tools::ToolRegistry;

use super::SharedProvider;

const DEFAULT_INSTRUCTIONS: &str = "You are a multi-tool agent with access to various tools for data processing, \
analysis, and integration. You can handle complex tasks by breaking them down \
into steps and using the appropriate tools for each step.\n\n\
When processing user requests, identify the required tools and execute them \
in the correct sequence. Maintain context between steps and handle errors gracefully.";

#[derive(Clone)]
pub struct MultiToolAgentConfig {
    pub name: String,
    pub instructions: String,
    pub tools: ToolRegistry,
    pub output_type: Option<String>,
    pub max_iterations: usize,
    pub debug_mode: bool,
}

impl MultiToolAgentConfig {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: ToolRegistry::new(),
            output_type: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            debug_mode: false,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }
}

impl Default for MultiToolAgentConfig {
    fn default() -> Self {
        Self::new("MultiToolAgent", DEFAULT_INSTRUCTIONS)
            .with_tools(
                ToolRegistry::builder()
                    .tool(EchoTool)
                    .tool(AddTool)
                    .tool(MultiplyTool)
                    .tool(ToUppercaseTool)
                    .tool(CurrentTimeTool)
                    .tool(FetchMockDataTool)
                    .build(),
            )
            .with_debug_mode(true)
    }
}

/// Hooks that drive a StateMachine and fill a ContextManager
#[derive(Debug, Clone)]
pub struct StateTrackingHooks {
    context: Arc<Mutex<ContextManager>>,
    state: Arc<Mutex<StateMachine>>,
    debug_mode: bool,
}

impl StateTrackingHooks {
    pub fn new(
        context: Arc<Mutex<ContextManager>>,
        state: Arc<Mutex<StateMachine>>,
        debug_mode: bool,
    ) -> Self {
        Self {
            context,
            state,
            debug_mode,
        }
    }

    fn log(&self, line: String) {
        if self.debug_mode {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
    }

    async fn transition(&self, next: AgentState) {
        self.state.lock().await.transition_to(next);
    }
}

#[async_trait]
impl RunHooks for StateTrackingHooks {
    async fn on_agent_start(&self, agent: &Agent) {
        self.transition(AgentState::Initializing).await;
        self.log(agent_start_line(agent));
        self.context
            .lock()
            .await
            .store("agent_start_time", Utc::now().to_rfc3339());
    }

    async fn on_agent_end(&self, agent: &Agent, output: &str) {
        self.transition(AgentState::Completed).await;
        self.log(agent_end_line(agent, output));
        let mut context = self.context.lock().await;
        context.store("agent_end_time", Utc::now().to_rfc3339());
        context.store("agent_output", output);
    }

    async fn on_tool_start(&self, _agent: &Agent, tool_name: &str) {
        self.transition(AgentState::ExecutingTool).await;
        self.log(tool_start_line(tool_name));
        self.context.lock().await.store("current_tool", tool_name);
    }

    async fn on_tool_end(&self, _agent: &Agent, tool_name: &str, result: &str) {
        self.transition(AgentState::Processing).await;
        self.log(tool_end_line(tool_name, result));

        let mut context = self.context.lock().await;
        let mut results = match context.get_or("tool_results", Value::Object(Map::new())) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        results.insert(tool_name.to_string(), Value::String(result.to_string()));
        context.store("tool_results", Value::Object(results));
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiToolOutput {
    pub final_output: String,
    pub context: Map<String, Value>,
    /// States visited during the run
    pub states: Vec<AgentState>,
}

pub struct MultiToolAgent {
    agent: Agent,
    provider: SharedProvider,
    debug_mode: bool,
}

impl MultiToolAgent {
    pub fn new(config: MultiToolAgentConfig, provider: SharedProvider, model: &str) -> Self {
        let mut instructions = build_instructions(&config.instructions, &config.tools);
        if let Some(output_type) = &config.output_type {
            instructions.push_str(&format!("\nFormat the final answer as: {}\n", output_type));
        }

        Self {
            agent: Agent::new(config.name, instructions)
                .with_model(model)
                .with_tools(config.tools)
                .with_max_iterations(config.max_iterations),
            provider,
            debug_mode: config.debug_mode,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Run with caller-supplied context entries; never fails
    pub async fn run(&self, input: &str, context: Option<Map<String, Value>>) -> MultiToolOutput {
        let context_manager = Arc::new(Mutex::new(ContextManager::new()));
        let state = Arc::new(Mutex::new(StateMachine::new()));

        {
            let mut ctx = context_manager.lock().await;
            for (key, value) in context.unwrap_or_default() {
                ctx.store(key, value);
            }
            ctx.store("input", input);
        }
        state.lock().await.transition_to(AgentState::Processing);

        let hooks = StateTrackingHooks::new(context_manager.clone(), state.clone(), self.debug_mode);
        let runner = Runner::new(self.provider.clone());

        let final_output = match runner.run(&self.agent, input, &hooks).await {
            Ok(result) => {
                let mut ctx = context_manager.lock().await;
                ctx.store(
                    "result",
                    serde_json::to_value(&result).unwrap_or(Value::Null),
                );
                result.final_output
            }
            Err(e) => {
                state.lock().await.transition_to(AgentState::Error);
                let message = format!("Error during agent execution: {}", e);
                context_manager.lock().await.store("error", message.clone());
                format!("Error: {}", message)
            }
        };

        let context = context_manager.lock().await.get_all();
        let states = state.lock().await.history().to_vec();
        MultiToolOutput {
            final_output,
            context,
            states,
        }
    }
}

/// Base instructions followed by a bullet list of the registered tools
pub fn build_instructions(base: &str, tools: &ToolRegistry) -> String {
    let mut instructions = format!("{}\n\nAvailable tools:\n", base);
    for (name, description) in tools.tool_descriptions() {
        instructions.push_str(&format!("- {}: {}\n", name, description));
    }
    instructions
}
