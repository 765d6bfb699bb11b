// In-memory LLM provider for tests and offline runs
//
// ScriptedLlmProvider replays queued responses in order and records every
// call, so runner and agent behavior can be exercised without network access.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AgentError, Result};
use crate::llm::{
    LlmCallConfig, LlmMessage, LlmProvider, LlmResponseStream, LlmStreamEvent, TurnSummary,
};
use crate::tool_types::ToolCall;

/// One scripted model turn
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    /// Text deltas emitted in order
    pub chunks: Vec<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Fail the call instead of streaming
    pub error: Option<String>,
}

impl ScriptedResponse {
    /// Text-only response delivered as a single delta
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![text.into()],
            ..Default::default()
        }
    }

    /// Text response split into several deltas
    pub fn chunks(chunks: Vec<&str>) -> Self {
        Self {
            chunks: chunks.into_iter().map(String::from).collect(),
            ..Default::default()
        }
    }

    /// Response requesting tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Default::default()
        }
    }

    /// Response requesting a single tool call
    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::tool_calls(vec![ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }])
    }

    /// Provider-level failure
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// A recorded call to the scripted provider
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<LlmMessage>,
    pub config: LlmCallConfig,
}

/// Scripted LLM provider
///
/// Returns queued responses in sequence; once the queue is empty every call
/// answers with a fixed fallback text.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLlmProvider {
    responses: Arc<RwLock<VecDeque<ScriptedResponse>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl ScriptedLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider pre-loaded with responses
    pub fn with_responses(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Arc::new(RwLock::new(responses.into())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue another response
    pub async fn push(&self, response: ScriptedResponse) {
        self.responses.write().await.push_back(response);
    }

    /// Calls received so far
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    async fn chat_completion_stream(
        &self,
        messages: Vec<LlmMessage>,
        config: &LlmCallConfig,
    ) -> Result<LlmResponseStream> {
        self.calls.write().await.push(RecordedCall {
            messages,
            config: config.clone(),
        });

        let response = self
            .responses
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedResponse::text("Scripted response (queue empty)"));

        if let Some(error) = response.error {
            return Err(AgentError::llm(error));
        }

        let text_deltas = response.chunks.len() as u32;
        let mut events: Vec<Result<LlmStreamEvent>> = response
            .chunks
            .into_iter()
            .map(|chunk| Ok(LlmStreamEvent::TextDelta(chunk)))
            .collect();
        if let Some(tool_calls) = response.tool_calls {
            events.push(Ok(LlmStreamEvent::ToolCalls(tool_calls)));
        }
        events.push(Ok(LlmStreamEvent::Done(TurnSummary {
            model: Some(config.model.clone()),
            finish_reason: Some("stop".to_string()),
            text_deltas,
        })));

        Ok(Box::pin(stream::iter(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_in_order_and_records_calls() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("call_1", "add", json!({"a": 1, "b": 2})),
            ScriptedResponse::text("3"),
        ]);
        let config = LlmCallConfig::new("test-model");

        let first = provider
            .chat_completion(vec![LlmMessage::user("1+2?")], &config)
            .await
            .unwrap();
        assert_eq!(first.tool_calls.len(), 1);

        let second = provider
            .chat_completion(vec![LlmMessage::user("again")], &config)
            .await
            .unwrap();
        assert_eq!(second.text, "3");

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].messages[0].content, "1+2?");
        assert_eq!(calls[1].config.model, "test-model");
    }

    #[tokio::test]
    async fn test_chunks_stream_separately() {
        let provider =
            ScriptedLlmProvider::with_responses(vec![ScriptedResponse::chunks(vec!["a", "b"])]);
        let mut stream = provider
            .chat_completion_stream(vec![], &LlmCallConfig::new("m"))
            .await
            .unwrap();

        let mut deltas = Vec::new();
        while let Some(event) = stream.next().await {
            if let LlmStreamEvent::TextDelta(d) = event.unwrap() {
                deltas.push(d);
            }
        }
        assert_eq!(deltas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_error_response() {
        let provider =
            ScriptedLlmProvider::with_responses(vec![ScriptedResponse::error("quota exceeded")]);
        let err = provider
            .chat_completion(vec![], &LlmCallConfig::new("m"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
