// Agent state machine
//
// Tracks the coarse lifecycle of a run. Transitions are always recorded;
// ones outside the allowed table are logged so misbehaving hooks show up.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Initializing,
    Processing,
    ExecutingTool,
    Error,
    Completed,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Initializing => "initializing",
            AgentState::Processing => "processing",
            AgentState::ExecutingTool => "executing_tool",
            AgentState::Error => "error",
            AgentState::Completed => "completed",
        }
    }

    /// States reachable from this one
    pub fn allowed_next(&self) -> &'static [AgentState] {
        match self {
            AgentState::Initializing => &[AgentState::Processing, AgentState::Error],
            AgentState::Processing => &[
                AgentState::ExecutingTool,
                AgentState::Completed,
                AgentState::Error,
            ],
            AgentState::ExecutingTool => &[AgentState::Processing, AgentState::Error],
            AgentState::Error => &[AgentState::Initializing, AgentState::Processing],
            AgentState::Completed => &[AgentState::Initializing],
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    current: AgentState,
    history: Vec<AgentState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::starting_at(AgentState::Initializing)
    }

    pub fn starting_at(initial: AgentState) -> Self {
        Self {
            current: initial,
            history: vec![initial],
        }
    }

    pub fn current_state(&self) -> AgentState {
        self.current
    }

    pub fn history(&self) -> &[AgentState] {
        &self.history
    }

    pub fn can_transition_to(&self, next: AgentState) -> bool {
        self.current.allowed_next().contains(&next)
    }

    /// Move to `next` unconditionally
    pub fn transition_to(&mut self, next: AgentState) {
        if !self.can_transition_to(next) {
            warn!(from = %self.current, to = %next, "Unexpected agent state transition");
        }
        self.current = next;
        self.history.push(next);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
