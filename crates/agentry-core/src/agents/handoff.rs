// Handoff agent
//
// Routes a message to a specialist by keyword, then runs the specialist.
// Both steps are recorded as spans on a "Handoff" trace.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::hooks::NoopHooks;
use crate::runner::{Agent, Runner};
use crate::traces::{ActiveTrace, TraceProcessor};

use super::SharedProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistType {
    Billing,
    Technical,
    Sales,
    General,
}

/// Checked in order; the first specialist with a matching keyword wins
const ROUTING_TABLE: &[(SpecialistType, &[&str])] = &[
    (
        SpecialistType::Billing,
        &["invoice", "bill", "payment", "refund", "charge", "subscription"],
    ),
    (
        SpecialistType::Technical,
        &["error", "bug", "crash", "install", "login", "password", "not working"],
    ),
    (
        SpecialistType::Sales,
        &["price", "pricing", "quote", "buy", "purchase", "demo", "plan"],
    ),
];

impl SpecialistType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialistType::Billing => "billing",
            SpecialistType::Technical => "technical",
            SpecialistType::Sales => "sales",
            SpecialistType::General => "general",
        }
    }

    pub fn agent_name(&self) -> &'static str {
        match self {
            SpecialistType::Billing => "BillingAgent",
            SpecialistType::Technical => "TechnicalSupportAgent",
            SpecialistType::Sales => "SalesAgent",
            SpecialistType::General => "GeneralAgent",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            SpecialistType::Billing => {
                "You are a billing specialist. Help with invoices, payments, refunds and subscriptions."
            }
            SpecialistType::Technical => {
                "You are a technical support specialist. Diagnose the problem and give clear troubleshooting steps."
            }
            SpecialistType::Sales => {
                "You are a sales specialist. Explain plans and pricing and help the customer choose."
            }
            SpecialistType::General => {
                "You are a helpful general assistant. Answer the question directly and concisely."
            }
        }
    }
}

impl std::fmt::Display for SpecialistType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the specialist for `message` by case-insensitive keyword match
pub fn determine_agent_type(message: &str) -> SpecialistType {
    let lower = message.to_lowercase();
    ROUTING_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(SpecialistType::General)
}

#[derive(Debug, Clone, Serialize)]
pub struct HandoffOutcome {
    pub agent_type: SpecialistType,
    pub agent_name: String,
    pub response: String,
    pub trace_id: String,
}

pub struct HandoffAgent {
    provider: SharedProvider,
    model: String,
    traces: TraceProcessor,
}

impl HandoffAgent {
    pub fn new(provider: SharedProvider, model: impl Into<String>, traces: TraceProcessor) -> Self {
        Self {
            provider,
            model: model.into(),
            traces,
        }
    }

    pub fn specialist(&self, kind: SpecialistType) -> Agent {
        Agent::new(kind.agent_name(), kind.instructions()).with_model(&self.model)
    }

    /// Run the specialist for `kind`, recording spans on `trace` when given
    pub async fn process_with_specialized_agent(
        &self,
        message: &str,
        kind: SpecialistType,
        trace: Option<&ActiveTrace>,
    ) -> Result<String> {
        let mut runner = Runner::new(self.provider.clone());
        if let Some(trace) = trace {
            runner = runner.with_trace(trace.clone());
        }
        let result = runner
            .run(&self.specialist(kind), message, &NoopHooks)
            .await?;
        Ok(result.final_output)
    }

    pub async fn handle(&self, message: &str) -> Result<HandoffOutcome> {
        let trace = self.traces.start_trace("Handoff");

        let kind = {
            let mut span = trace.span("determine_agent_type");
            let kind = determine_agent_type(message);
            span.set_metadata("agent_type", kind.as_str());
            kind
        };
        info!(agent_type = %kind, agent = kind.agent_name(), "Handing off message");

        let response = {
            let mut span = trace.span("process_with_specialized_agent");
            span.set_metadata("agent_name", kind.agent_name());
            let outcome = self
                .process_with_specialized_agent(message, kind, Some(&trace))
                .await;
            span.set_metadata("success", outcome.is_ok());
            outcome
        };

        trace.set_metadata("agent_type", kind.as_str());
        let finished = trace.finish();

        Ok(HandoffOutcome {
            agent_type: kind,
            agent_name: kind.agent_name().to_string(),
            response: response?,
            trace_id: finished.trace_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use std::sync::Arc;

    #[test]
    fn test_routing_table() {
        assert_eq!(
            determine_agent_type("I need a refund for my last invoice"),
            SpecialistType::Billing
        );
        assert_eq!(
            determine_agent_type("The app is NOT WORKING after install"),
            SpecialistType::Technical
        );
        assert_eq!(
            determine_agent_type("What is the pricing for the team plan?"),
            SpecialistType::Sales
        );
        assert_eq!(determine_agent_type("Tell me a joke"), SpecialistType::General);
    }

    #[test]
    fn test_billing_wins_over_later_matches() {
        // "payment" (billing) and "error" (technical) both match
        assert_eq!(
            determine_agent_type("payment error"),
            SpecialistType::Billing
        );
    }

    #[tokio::test]
    async fn test_handle_runs_specialist_with_spans() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text(
            "Your refund is on its way.",
        )]);
        let traces = TraceProcessor::new();
        let agent = HandoffAgent::new(Arc::new(provider.clone()), "gpt-4o-mini", traces.clone());

        let outcome = agent.handle("Where is my refund?").await.unwrap();
        assert_eq!(outcome.agent_type, SpecialistType::Billing);
        assert_eq!(outcome.agent_name, "BillingAgent");
        assert_eq!(outcome.response, "Your refund is on its way.");

        let calls = provider.calls().await;
        assert!(calls[0].messages[0].content.contains("billing specialist"));

        let trace = traces.get_trace(&outcome.trace_id).unwrap();
        let names: Vec<&str> = trace.spans.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"determine_agent_type"));
        assert!(names.contains(&"process_with_specialized_agent"));
        assert!(names.contains(&"llm_call"));
    }

    #[tokio::test]
    async fn test_handle_error_still_records_trace() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::error("nope")]);
        let traces = TraceProcessor::new();
        let agent = HandoffAgent::new(Arc::new(provider), "gpt-4o-mini", traces.clone());

        assert!(agent.handle("hello").await.is_err());
        assert_eq!(traces.get_trace_summary().count, 1);
    }
}
