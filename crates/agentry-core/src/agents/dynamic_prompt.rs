// Dynamic prompt agent: the system prompt can be swapped at runtime

use tokio::sync::RwLock;
use tracing::info;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug)]
pub struct DynamicPromptAgent {
    system_prompt: RwLock<String>,
}

impl DynamicPromptAgent {
    pub fn new() -> Self {
        Self::with_prompt(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: RwLock::new(prompt.into()),
        }
    }

    pub async fn system_prompt(&self) -> String {
        self.system_prompt.read().await.clone()
    }

    /// Replace the prompt and return the new value
    pub async fn update_system_prompt(&self, new_prompt: &str) -> String {
        *self.system_prompt.write().await = new_prompt.to_string();
        info!(prompt = %new_prompt, "System prompt updated");
        new_prompt.to_string()
    }

    pub async fn execute(&self, input: &str) -> String {
        let prompt = self.system_prompt.read().await;
        format!("[{}] Response to: {}", prompt, input)
    }
}

impl Default for DynamicPromptAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_and_execute() {
        let agent = DynamicPromptAgent::new();
        assert_eq!(agent.system_prompt().await, DEFAULT_SYSTEM_PROMPT);

        let updated = agent
            .update_system_prompt("You are now an advanced assistant.")
            .await;
        assert_eq!(updated, "You are now an advanced assistant.");

        let response = agent.execute("Test dynamic prompt agent execution.").await;
        assert!(response.contains("Test dynamic prompt agent execution."));
        assert!(response.contains("You are now an advanced assistant."));
    }
}
