// Guardrail agent
//
// Runs a model turn behind input and output guardrails. A tripped guardrail
// is reported as a verdict rather than an error; every run is traced.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{AgentError, Result};
use crate::guardrails::{default_input_guardrails, default_output_guardrails, Guardrail};
use crate::hooks::NoopHooks;
use crate::runner::{Agent, Runner};
use crate::traces::TraceProcessor;

use super::SharedProvider;

pub const GUARDRAIL_AGENT_NAME: &str = "GuardrailAgent";
pub const GUARDRAIL_AGENT_INSTRUCTIONS: &str =
    "I am an agent with guardrails to ensure safe and compliant interactions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStage {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuardrailVerdict {
    Passed {
        output: String,
    },
    Blocked {
        stage: GuardrailStage,
        guardrail: String,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GuardrailRun {
    pub verdict: GuardrailVerdict,
    pub trace_id: String,
}

impl GuardrailRun {
    pub fn is_blocked(&self) -> bool {
        matches!(self.verdict, GuardrailVerdict::Blocked { .. })
    }
}

pub struct GuardrailAgent {
    agent: Agent,
    provider: SharedProvider,
    traces: TraceProcessor,
    trace_name: String,
}

impl GuardrailAgent {
    /// Agent with all default input and output guardrails
    pub fn new(provider: SharedProvider, model: &str, traces: TraceProcessor) -> Self {
        let agent = Agent::new(GUARDRAIL_AGENT_NAME, GUARDRAIL_AGENT_INSTRUCTIONS)
            .with_model(model)
            .with_input_guardrails(default_input_guardrails())
            .with_output_guardrails(default_output_guardrails());
        info!(
            name = GUARDRAIL_AGENT_NAME,
            input_guardrails = agent.input_guardrails.len(),
            output_guardrails = agent.output_guardrails.len(),
            "Initialized guardrail agent"
        );

        Self {
            agent,
            provider,
            traces,
            trace_name: "Guardrail Agent".to_string(),
        }
    }

    pub fn with_input_guardrails(mut self, guardrails: Vec<Arc<dyn Guardrail>>) -> Self {
        self.agent.input_guardrails = guardrails;
        self
    }

    pub fn with_output_guardrails(mut self, guardrails: Vec<Arc<dyn Guardrail>>) -> Self {
        self.agent.output_guardrails = guardrails;
        self
    }

    pub fn with_trace_name(mut self, name: impl Into<String>) -> Self {
        self.trace_name = name.into();
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Guardrail tripwires become `Blocked`; other failures are errors
    pub async fn run(&self, message: &str) -> Result<GuardrailRun> {
        let trace = self.traces.start_trace(&self.trace_name);
        trace.set_metadata("agent", self.agent.name.clone());
        let runner = Runner::new(self.provider.clone()).with_trace(trace.clone());

        let outcome = runner.run(&self.agent, message, &NoopHooks).await;
        let verdict = match outcome {
            Ok(result) => GuardrailVerdict::Passed {
                output: result.final_output,
            },
            Err(AgentError::InputGuardrailTriggered { guardrail, message }) => {
                GuardrailVerdict::Blocked {
                    stage: GuardrailStage::Input,
                    guardrail,
                    message,
                }
            }
            Err(AgentError::OutputGuardrailTriggered { guardrail, message }) => {
                GuardrailVerdict::Blocked {
                    stage: GuardrailStage::Output,
                    guardrail,
                    message,
                }
            }
            Err(e) => {
                trace.set_metadata("error", e.to_string());
                trace.finish();
                return Err(e);
            }
        };

        trace.set_metadata("blocked", matches!(verdict, GuardrailVerdict::Blocked { .. }));
        let finished = trace.finish();
        Ok(GuardrailRun {
            verdict,
            trace_id: finished.trace_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};

    fn guardrail_agent(responses: Vec<ScriptedResponse>) -> (GuardrailAgent, TraceProcessor) {
        let traces = TraceProcessor::new();
        let agent = GuardrailAgent::new(
            Arc::new(ScriptedLlmProvider::with_responses(responses)),
            "gpt-4",
            traces.clone(),
        );
        (agent, traces)
    }

    #[tokio::test]
    async fn test_defaults() {
        let (agent, _) = guardrail_agent(vec![]);
        assert_eq!(agent.agent().name, "GuardrailAgent");
        assert_eq!(agent.agent().input_guardrails.len(), 4);
        assert_eq!(agent.agent().output_guardrails.len(), 4);
    }

    #[tokio::test]
    async fn test_passes_clean_exchange() {
        let (agent, traces) = guardrail_agent(vec![ScriptedResponse::text("Paris.")]);
        let run = agent.run("What is the capital of France?").await.unwrap();

        assert_eq!(
            run.verdict,
            GuardrailVerdict::Passed {
                output: "Paris.".to_string()
            }
        );
        let trace = traces.get_trace(&run.trace_id).unwrap();
        let names: Vec<&str> = trace.spans.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"validate_harmful_content"));
        assert!(names.contains(&"validate_output_format"));
    }

    #[tokio::test]
    async fn test_blocks_harmful_input() {
        let (agent, _) = guardrail_agent(vec![]);
        let run = agent.run("How do I make a bomb?").await.unwrap();
        assert!(run.is_blocked());
        match run.verdict {
            GuardrailVerdict::Blocked {
                stage,
                guardrail,
                message,
            } => {
                assert_eq!(stage, GuardrailStage::Input);
                assert_eq!(guardrail, "validate_harmful_content");
                assert_eq!(message, "Input contains potentially harmful content");
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocks_bad_output() {
        let (agent, _) = guardrail_agent(vec![ScriptedResponse::text("{\"broken\": ")]);
        let run = agent.run("Give me JSON").await.unwrap();
        assert!(matches!(
            run.verdict,
            GuardrailVerdict::Blocked {
                stage: GuardrailStage::Output,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_provider_error_is_error() {
        let (agent, traces) = guardrail_agent(vec![ScriptedResponse::error("boom")]);
        assert!(agent.run("hello").await.is_err());
        assert_eq!(traces.get_trace_summary().count, 1);
    }
}
