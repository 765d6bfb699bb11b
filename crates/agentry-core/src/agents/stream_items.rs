// Streaming items agent
//
// Decides how many items to produce (a forced `how_many_items` tool call
// unless the caller gave a count), generates them in one completion and
// streams them back one event at a time.

use futures::stream::{BoxStream, StreamExt};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::llm::{LlmCallConfig, LlmMessage, ToolChoice};
use crate::tool_types::{FunctionTool, ToolDefinition};

use super::stream_text::{AgentStatus, DEFAULT_STREAM_MODEL};
use super::SharedProvider;

pub const DEFAULT_MAX_ITEMS: usize = 10;
const COUNT_TOOL: &str = "how_many_items";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEvent {
    Status { message: String },
    Count { count: usize, message: String },
    Item { index: usize, content: String },
    Complete { message: String },
    Error { message: String },
}

#[derive(Clone)]
pub struct StreamItemsAgent {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub max_items: usize,
    item_delay: Duration,
    provider: SharedProvider,
}

impl StreamItemsAgent {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            name: "ItemStreamer".to_string(),
            instructions: "Generate items based on the request.".to_string(),
            model: DEFAULT_STREAM_MODEL.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            item_delay: Duration::from_millis(200),
            provider,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Pause between item events
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn initialize(&self) -> AgentStatus {
        AgentStatus::new("initialized", &self.name)
    }

    pub fn terminate(&self) -> AgentStatus {
        AgentStatus::new("terminated", &self.name)
    }

    fn clamp(&self, count: i64) -> usize {
        count.clamp(1, self.max_items as i64) as usize
    }

    fn count_tool(&self, category: &str) -> ToolDefinition {
        ToolDefinition::Function(FunctionTool {
            name: COUNT_TOOL.to_string(),
            description: format!(
                "Determine how many {} items to generate (1-{})",
                category, self.max_items
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "count": {
                        "type": "integer",
                        "description": format!(
                            "Number of {} items to generate (between 1 and {})",
                            category, self.max_items
                        )
                    }
                },
                "required": ["count"]
            }),
        })
    }

    /// Ask the model for a count; falls back to a random one in range
    pub async fn determine_item_count(&self, category: &str) -> Result<usize> {
        let config = LlmCallConfig::new(&self.model)
            .with_tools(vec![self.count_tool(category)])
            .with_tool_choice(ToolChoice::Function(COUNT_TOOL.to_string()));
        let messages = vec![
            LlmMessage::system(&self.instructions),
            LlmMessage::user(format!("How many {} items should I generate?", category)),
        ];

        let response = self.provider.chat_completion(messages, &config).await?;
        let requested = response
            .tool_calls
            .iter()
            .find(|call| call.name == COUNT_TOOL)
            .and_then(|call| call.arguments.get("count"))
            .and_then(|v| v.as_i64());

        let count = match requested {
            Some(count) => count,
            None => {
                warn!(category = %category, "Model did not provide an item count, picking one");
                rand::thread_rng().gen_range(1..=self.max_items as i64)
            }
        };
        Ok(self.clamp(count))
    }

    /// Generate up to `count` items, one per non-empty line
    pub async fn generate_items(&self, category: &str, count: usize) -> Result<Vec<String>> {
        let messages = vec![
            LlmMessage::system(&self.instructions),
            LlmMessage::user(format!(
                "Generate {} {} items. Format each item on a new line with a number and a dash, like '1 - Item content'.",
                count, category
            )),
        ];
        let response = self
            .provider
            .chat_completion(messages, &LlmCallConfig::new(&self.model))
            .await?;

        Ok(response
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(count)
            .map(String::from)
            .collect())
    }

    async fn produce(
        &self,
        category: &str,
        count: Option<i64>,
        tx: &mpsc::Sender<ItemEvent>,
    ) -> Result<()> {
        let send = |event: ItemEvent| async move {
            tx.send(event)
                .await
                .map_err(|_| AgentError::tool("item stream receiver dropped"))
        };

        send(ItemEvent::Status {
            message: format!("Determining number of {} items to generate...", category),
        })
        .await?;

        let count = match count {
            Some(count) => self.clamp(count),
            None => self.determine_item_count(category).await?,
        };
        send(ItemEvent::Count {
            count,
            message: format!("Will generate {} {} items.", count, category),
        })
        .await?;

        send(ItemEvent::Status {
            message: format!("Generating {} {} items...", count, category),
        })
        .await?;

        let items = self.generate_items(category, count).await?;
        let total = items.len();
        for (i, content) in items.into_iter().enumerate() {
            send(ItemEvent::Item {
                index: i + 1,
                content,
            })
            .await?;
            if !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        send(ItemEvent::Complete {
            message: format!("Generated {} {} items.", total, category),
        })
        .await
    }

    /// Event stream for `category`; failures end the stream with an error event
    pub fn execute(&self, category: &str, count: Option<i64>) -> BoxStream<'static, ItemEvent> {
        let (tx, rx) = mpsc::channel(16);
        let agent = self.clone();
        let category = category.to_string();

        tokio::spawn(async move {
            if let Err(e) = agent.produce(&category, count, &tx).await {
                debug!(error = %e, "Item stream ended with error");
                let event = ItemEvent::Error {
                    message: e.to_string(),
                };
                if tx.send(event).await.is_err() {
                    debug!("Item stream receiver gone before the error was delivered");
                }
            }
        });

        ReceiverStream::new(rx).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ScriptedLlmProvider, ScriptedResponse};
    use std::sync::Arc;

    fn agent(provider: &ScriptedLlmProvider) -> StreamItemsAgent {
        StreamItemsAgent::new(Arc::new(provider.clone())).with_item_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_explicit_count_is_clamped_and_items_truncated() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text(
            "1 - first\n\n  2 - second  \n3 - third",
        )]);
        let events: Vec<ItemEvent> = agent(&provider).execute("jokes", Some(2)).collect().await;

        assert_eq!(
            events[1],
            ItemEvent::Count {
                count: 2,
                message: "Will generate 2 jokes items.".to_string()
            }
        );
        let items: Vec<&ItemEvent> = events
            .iter()
            .filter(|e| matches!(e, ItemEvent::Item { .. }))
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            &ItemEvent::Item {
                index: 2,
                content: "2 - second".to_string()
            }
        );
        assert!(matches!(events.last(), Some(ItemEvent::Complete { .. })));
        // no count negotiation when the caller supplies one
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_count_from_forced_tool_call() {
        let provider = ScriptedLlmProvider::with_responses(vec![
            ScriptedResponse::tool_call("c1", "how_many_items", json!({"count": 50})),
            ScriptedResponse::text("a\nb\nc"),
        ]);
        let events: Vec<ItemEvent> = agent(&provider).execute("facts", None).collect().await;

        assert!(events.contains(&ItemEvent::Count {
            count: 10,
            message: "Will generate 10 facts items.".to_string()
        }));
        let calls = provider.calls().await;
        assert_eq!(
            calls[0].config.tool_choice,
            Some(ToolChoice::Function("how_many_items".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_count_falls_back_to_range() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text("no tool")]);
        let count = agent(&provider).with_max_items(3).determine_item_count("tips").await.unwrap();
        assert!((1..=3).contains(&count));
    }

    #[tokio::test]
    async fn test_provider_failure_emits_error_event() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::error("down")]);
        let events: Vec<ItemEvent> = agent(&provider).execute("quotes", Some(1)).collect().await;
        assert!(matches!(events.last(), Some(ItemEvent::Error { message }) if message.contains("down")));
    }

    #[tokio::test]
    async fn test_producer_stops_when_stream_dropped() {
        let provider = ScriptedLlmProvider::with_responses(vec![ScriptedResponse::text("a\nb")]);
        drop(agent(&provider).execute("quotes", Some(2)));

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        // the first status event already fails, so the model is never asked
        assert_eq!(provider.call_count().await, 0);
    }
}
