// Lifecycle agent: initialize / execute / terminate without a model

use serde::Serialize;
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Created,
    Initialized,
    Terminated,
}

#[derive(Debug)]
pub struct LifecycleAgent {
    status: Mutex<LifecycleStatus>,
}

impl LifecycleAgent {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(LifecycleStatus::Created),
        }
    }

    fn set(&self, status: LifecycleStatus) {
        let mut guard = self.status.lock().unwrap_or_else(|p| p.into_inner());
        *guard = status;
    }

    pub fn status(&self) -> LifecycleStatus {
        *self.status.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn initialize(&self) -> String {
        self.set(LifecycleStatus::Initialized);
        info!("Lifecycle agent initialized");
        "Lifecycle agent initialized.".to_string()
    }

    pub fn execute(&self, input: &str) -> String {
        if self.status() != LifecycleStatus::Initialized {
            warn!(status = ?self.status(), "Lifecycle agent executed before initialize");
        }
        format!("Lifecycle agent processed input: {}", input)
    }

    pub fn terminate(&self) -> String {
        self.set(LifecycleStatus::Terminated);
        info!("Lifecycle agent terminated");
        "Lifecycle agent terminated.".to_string()
    }
}

impl Default for LifecycleAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let agent = LifecycleAgent::new();
        assert_eq!(agent.status(), LifecycleStatus::Created);

        assert_eq!(agent.initialize(), "Lifecycle agent initialized.");
        let result = agent.execute("Sample input for lifecycle agent");
        assert!(result.contains("Sample input for lifecycle agent"));

        assert_eq!(agent.terminate(), "Lifecycle agent terminated.");
        assert_eq!(agent.status(), LifecycleStatus::Terminated);
    }

    #[test]
    fn test_execute_without_initialize_still_answers() {
        let agent = LifecycleAgent::default();
        assert!(agent.execute("x").ends_with("x"));
    }
}
