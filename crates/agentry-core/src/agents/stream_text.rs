// Streaming text agent: forwards model text deltas as they arrive

use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::llm::{LlmCallConfig, LlmMessage, LlmStreamEvent};

use super::SharedProvider;

pub const DEFAULT_STREAM_MODEL: &str = "gpt-3.5-turbo";

/// Status returned by initialize / terminate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub status: String,
    pub name: String,
}

impl AgentStatus {
    pub(crate) fn new(status: &str, name: &str) -> Self {
        Self {
            status: status.to_string(),
            name: name.to_string(),
        }
    }
}

pub struct StreamTextAgent {
    pub name: String,
    pub instructions: String,
    pub model: String,
    provider: SharedProvider,
}

impl StreamTextAgent {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            name: "TextStreamer".to_string(),
            instructions: "You are a helpful assistant.".to_string(),
            model: DEFAULT_STREAM_MODEL.to_string(),
            provider,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn initialize(&self) -> AgentStatus {
        AgentStatus::new("initialized", &self.name)
    }

    pub fn terminate(&self) -> AgentStatus {
        AgentStatus::new("terminated", &self.name)
    }

    /// Text chunks of the model's answer to `input`
    pub async fn execute(&self, input: &str) -> Result<BoxStream<'static, Result<String>>> {
        let messages = vec![
            LlmMessage::system(&self.instructions),
            LlmMessage::user(input),
        ];
        let stream = self
            .provider
            .chat_completion_stream(messages, &LlmCallConfig::new(&self.model))
            .await?;

        Ok(stream
            .filter_map(|event| async move {
                match event {
                    Ok(LlmStreamEvent::TextDelta(delta)) if !delta.is_empty() => Some(Ok(delta)),
                    Ok(LlmStreamEvent::Error(message)) => Some(Err(AgentError::llm(message))),
                    Err(e) => Some(Err(e)),
                    Ok(_) => None,
                }
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_streams_chunks_in_order() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::chunks(vec![
            "Once ", "upon ", "a time",
        ])]);
        let agent = StreamTextAgent::new(Arc::new(provider.clone()));

        let chunks: Vec<String> = agent
            .execute("Tell me a story")
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.concat(), "Once upon a time");
        assert_eq!(provider.calls().await[0].config.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_status() {
        let agent = StreamTextAgent::new(Arc::new(ScriptedLlmProvider::new()));
        assert_eq!(agent.initialize(), AgentStatus::new("initialized", "TextStreamer"));
        assert_eq!(agent.terminate().status, "terminated");
    }
}
