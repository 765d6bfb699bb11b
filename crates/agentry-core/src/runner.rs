// Agent runner
//
// Runs one agent to completion: input guardrails, then a bounded loop of
// model call -> tool execution, then output guardrails. Lifecycle hooks
// bracket the run and each tool call; spans go to an optional active trace.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AgentError, Result};
use crate::guardrails::Guardrail;
use crate::hooks::RunHooks;
use crate::llm::{LlmCallConfig, LlmMessage, LlmProvider};
use crate::tool_types::ToolResult;
use crate::tools::ToolRegistry;
use crate::traces::ActiveTrace;
use crate::traits::ToolExecutor;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Configuration of a single agent
#[derive(Clone)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: ToolRegistry,
    pub input_guardrails: Vec<Arc<dyn Guardrail>>,
    pub output_guardrails: Vec<Arc<dyn Guardrail>>,
    pub max_iterations: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: DEFAULT_MODEL.to_string(),
            tools: ToolRegistry::new(),
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_input_guardrails(mut self, guardrails: Vec<Arc<dyn Guardrail>>) -> Self {
        self.input_guardrails = guardrails;
        self
    }

    pub fn with_output_guardrails(mut self, guardrails: Vec<Arc<dyn Guardrail>>) -> Self {
        self.output_guardrails = guardrails;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn call_config(&self) -> LlmCallConfig {
        let mut config = LlmCallConfig::new(&self.model).with_tools(self.tools.tool_definitions());
        config.temperature = self.temperature;
        config.max_tokens = self.max_tokens;
        config
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tools)
            .field("input_guardrails", &self.input_guardrails.len())
            .field("output_guardrails", &self.output_guardrails.len())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// One executed tool call
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub result: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub final_output: String,
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Drives an agent against an LLM provider
pub struct Runner<P: LlmProvider> {
    provider: P,
    trace: Option<ActiveTrace>,
}

impl<P: LlmProvider> Runner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            trace: None,
        }
    }

    /// Record spans for this run on `trace`
    pub fn with_trace(mut self, trace: ActiveTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn run(&self, agent: &Agent, input: &str, hooks: &dyn RunHooks) -> Result<RunResult> {
        info!(agent = %agent.name, model = %agent.model, "Starting agent run");
        hooks.on_agent_start(agent).await;

        self.check_guardrails(&agent.input_guardrails, input, true)?;

        let config = agent.call_config();
        let mut messages = vec![
            LlmMessage::system(&agent.instructions),
            LlmMessage::user(input),
        ];
        let mut records = Vec::new();
        let mut final_output = None;
        let mut iterations = 0;

        while iterations < agent.max_iterations {
            iterations += 1;
            debug!(agent = %agent.name, iteration = iterations, "Calling model");

            let response = {
                let mut span = self.trace.as_ref().map(|t| t.span("llm_call"));
                if let Some(span) = span.as_mut() {
                    span.set_metadata("model", agent.model.clone());
                    span.set_metadata("iteration", iterations);
                }
                self.provider
                    .chat_completion(messages.clone(), &config)
                    .await?
            };

            if response.tool_calls.is_empty() {
                final_output = Some(response.text);
                break;
            }

            messages.push(LlmMessage::assistant_tool_calls(
                response.text,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                hooks.on_tool_start(agent, &call.name).await;

                let result = {
                    let mut span = self.trace.as_ref().map(|t| t.span(format!("tool:{}", call.name)));
                    if let Some(span) = span.as_mut() {
                        span.set_metadata("tool_call_id", call.id.clone());
                    }
                    match agent.tools.execute(call).await {
                        Ok(result) => result,
                        Err(AgentError::ToolNotFound(name)) => {
                            warn!(tool_name = %name, agent = %agent.name, "Model requested unknown tool");
                            ToolResult {
                                tool_call_id: call.id.clone(),
                                result: None,
                                error: Some(format!("Tool not found: {}", name)),
                            }
                        }
                        Err(e) => return Err(e),
                    }
                };

                let content = result.content();
                hooks.on_tool_end(agent, &call.name, &content).await;

                records.push(ToolCallRecord {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    result: content.clone(),
                });
                messages.push(LlmMessage::tool_result(&call.id, content));
            }
        }

        let Some(final_output) = final_output else {
            warn!(agent = %agent.name, max_iterations = agent.max_iterations, "Run hit iteration limit");
            return Err(AgentError::MaxIterationsReached(agent.max_iterations));
        };

        self.check_guardrails(&agent.output_guardrails, &final_output, false)?;

        hooks.on_agent_end(agent, &final_output).await;
        info!(
            agent = %agent.name,
            iterations,
            tool_calls = records.len(),
            "Agent run completed"
        );

        Ok(RunResult {
            final_output,
            iterations,
            tool_calls: records,
        })
    }

    fn check_guardrails(
        &self,
        guardrails: &[Arc<dyn Guardrail>],
        text: &str,
        input: bool,
    ) -> Result<()> {
        for guardrail in guardrails {
            let mut span = self.trace.as_ref().map(|t| t.span(guardrail.name()));
            let output = guardrail.check(text);
            if let Some(span) = span.as_mut() {
                span.set_metadata("tripwire_triggered", output.tripwire_triggered);
            }

            if output.tripwire_triggered {
                warn!(guardrail = %guardrail.name(), message = %output.message(), "Guardrail tripwire triggered");
                return Err(if input {
                    AgentError::input_guardrail(guardrail.name(), output.message())
                } else {
                    AgentError::output_guardrail(guardrail.name(), output.message())
                });
            }
        }
        Ok(())
    }
}

impl<P: LlmProvider + std::fmt::Debug> std::fmt::Debug for Runner<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("provider", &self.provider)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{AddTool, EchoTool};
    use crate::guardrails::{default_input_guardrails, default_output_guardrails};
    use crate::hooks::{LoggingHooks, NoopHooks};
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use crate::traces::TraceProcessor;
    use serde_json::json;
    use tokio::sync::Mutex;

    fn math_agent() -> Agent {
        Agent::new("Calculator", "Use tools for arithmetic")
            .with_tools(ToolRegistry::builder().tool(AddTool).tool(EchoTool).build())
    }

    #[tokio::test]
    async fn test_text_only_run() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text("Hi there")]);
        let runner = Runner::new(provider.clone());

        let result = runner.run(&math_agent(), "hello", &NoopHooks).await.unwrap();
        assert_eq!(result.final_output, "Hi there");
        assert_eq!(result.iterations, 1);
        assert!(result.tool_calls.is_empty());

        let calls = provider.calls().await;
        assert_eq!(calls[0].messages[0].content, "Use tools for arithmetic");
        assert_eq!(calls[0].messages[1].content, "hello");
        assert_eq!(calls[0].config.tools.len(), 2);
    }

    #[tokio::test]
    async fn test_tool_loop_feeds_results_back() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("call_1", "add", json!({"a": 2, "b": 3})),
            ScriptedResponse::text("The answer is 5"),
        ]);
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let hooks = LoggingHooks::capturing(buffer.clone());
        let runner = Runner::new(provider.clone());

        let result = runner.run(&math_agent(), "2+3?", &hooks).await.unwrap();
        assert_eq!(result.final_output, "The answer is 5");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls[0].name, "add");
        assert_eq!(result.tool_calls[0].result, "5.0");

        let second = &provider.calls().await[1];
        let tool_message = second.messages.last().unwrap();
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_message.content, "5.0");

        let lines = buffer.lock().await.clone();
        assert_eq!(lines.first().unwrap(), "[START] Agent 'Calculator' started.");
        assert!(lines.contains(&"[TOOL END] 'add' ended with result: 5.0".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "[END] Agent 'Calculator' ended with output: The answer is 5"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("call_1", "teleport", json!({})),
            ScriptedResponse::text("Sorry"),
        ]);
        let runner = Runner::new(provider.clone());

        let result = runner.run(&math_agent(), "go", &NoopHooks).await.unwrap();
        assert_eq!(result.final_output, "Sorry");
        assert_eq!(result.tool_calls[0].result, r#"{"error":"Tool not found: teleport"}"#);
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("c1", "echo", json!({"message": "a"})),
            ScriptedResponse::tool_call("c2", "echo", json!({"message": "b"})),
            ScriptedResponse::tool_call("c3", "echo", json!({"message": "c"})),
        ]);
        let runner = Runner::new(provider);
        let agent = math_agent().with_max_iterations(2);

        let err = runner.run(&agent, "loop", &NoopHooks).await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterationsReached(2)));
    }

    #[tokio::test]
    async fn test_input_guardrail_blocks_before_model_call() {
        let provider = ScriptedLlmProvider::new();
        let runner = Runner::new(provider.clone());
        let agent = math_agent().with_input_guardrails(default_input_guardrails());

        let err = runner.run(&agent, "   ", &NoopHooks).await.unwrap_err();
        match err {
            AgentError::InputGuardrailTriggered { guardrail, message } => {
                assert_eq!(guardrail, "validate_empty_input");
                assert_eq!(message, "Input cannot be empty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_output_guardrail_and_spans() {
        let provider =
            ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text("Error: upstream failed")]);
        let processor = TraceProcessor::new();
        let trace = processor.start_trace("Guardrails");
        let runner = Runner::new(provider).with_trace(trace.clone());
        let agent = math_agent().with_output_guardrails(default_output_guardrails());

        let err = runner.run(&agent, "status?", &NoopHooks).await.unwrap_err();
        assert!(err.is_guardrail());
        assert!(matches!(err, AgentError::OutputGuardrailTriggered { .. }));

        let finished = trace.finish();
        let names: Vec<&str> = finished.spans.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"llm_call"));
        assert!(names.contains(&"validate_no_error_in_output"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::error("boom")]);
        let runner = Runner::new(provider);
        let err = runner.run(&math_agent(), "x", &NoopHooks).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }
}
