//! Capabilities Module
//!
//! A capability bundles a set of related tools with an optional system prompt
//! addition. Agents pick capabilities by ID and get a ToolRegistry plus
//! extended instructions back from `apply_capabilities()`.
//!
//! Each capability is in its own file with collocated tools.

use crate::tool_types::ToolDefinition;
use crate::tools::{Tool, ToolRegistry};
use std::collections::HashMap;
use std::sync::Arc;

mod data;
mod datetime;
mod math;
mod operations;
mod text;

pub use data::{DataCapability, FetchMockDataTool, GetItemTool, SummarizeListTool};
pub use datetime::{AddDaysTool, CurrentTimeTool, DateTimeCapability};
pub use math::{AddTool, MathCapability, MultiplyTool};
pub use operations::OperationsCapability;
pub use text::{ConcatenateTool, EchoTool, HelloWorldTool, TextCapability, ToUppercaseTool};

/// Well-known capability identifiers
pub struct CapabilityId;

impl CapabilityId {
    pub const MATH: &'static str = "math";
    pub const TEXT: &'static str = "text";
    pub const DATETIME: &'static str = "datetime";
    pub const DATA: &'static str = "data";
    pub const OPERATIONS: &'static str = "operations";
}

// ============================================================================
// Capability Trait
// ============================================================================

/// Trait for implementing capabilities that extend agent functionality.
///
/// # Example
///
/// ```ignore
/// struct MathCapability;
///
/// impl Capability for MathCapability {
///     fn id(&self) -> &str {
///         CapabilityId::MATH
///     }
///
///     fn name(&self) -> &str {
///         "Math"
///     }
///
///     fn description(&self) -> &str {
///         "Arithmetic tools."
///     }
///
///     fn tools(&self) -> Vec<Box<dyn Tool>> {
///         vec![Box::new(AddTool), Box::new(MultiplyTool)]
///     }
/// }
/// ```
pub trait Capability: Send + Sync {
    /// Returns the unique capability identifier
    fn id(&self) -> &str;

    /// Returns the display name
    fn name(&self) -> &str;

    /// Returns a description of what this capability provides
    fn description(&self) -> &str;

    /// Returns text to prepend to the agent's instructions (optional)
    fn system_prompt_addition(&self) -> Option<&str> {
        None
    }

    /// Returns tool implementations provided by this capability
    fn tools(&self) -> Vec<Box<dyn Tool>> {
        vec![]
    }

    /// Returns tool definitions for the model request
    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools().iter().map(|t| t.to_definition()).collect()
    }
}

// ============================================================================
// Capability Registry
// ============================================================================

/// Registry that holds all available capability implementations.
#[derive(Clone)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Create a registry with all built-in capabilities registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(MathCapability);
        registry.register(TextCapability);
        registry.register(DateTimeCapability);
        registry.register(DataCapability);
        registry.register(OperationsCapability::default());
        registry
    }

    /// Register a capability
    pub fn register(&mut self, capability: impl Capability + 'static) {
        self.capabilities
            .insert(capability.id().to_string(), Arc::new(capability));
    }

    /// Get a capability by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities.get(id)
    }

    /// Check if a capability is registered
    pub fn has(&self, id: &str) -> bool {
        self.capabilities.contains_key(id)
    }

    /// Get all registered capabilities
    pub fn list(&self) -> Vec<&Arc<dyn Capability>> {
        self.capabilities.values().collect()
    }

    /// Get the number of registered capabilities
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.capabilities.keys().collect();
        ids.sort();
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &ids)
            .finish()
    }
}

// ============================================================================
// Apply Capabilities
// ============================================================================

/// Result of applying capabilities to base instructions
pub struct AppliedCapabilities {
    /// Instructions with capability additions prepended
    pub instructions: String,
    /// Tool registry containing all capability tools
    pub tool_registry: ToolRegistry,
    /// IDs of capabilities that were applied
    pub applied_ids: Vec<String>,
}

/// Apply capabilities, in order, to the base instructions.
///
/// Unknown capability IDs are skipped.
pub fn apply_capabilities(
    base_instructions: &str,
    capability_ids: &[&str],
    registry: &CapabilityRegistry,
) -> AppliedCapabilities {
    let mut prompt_parts: Vec<String> = Vec::new();
    let mut tool_registry = ToolRegistry::new();
    let mut applied_ids = Vec::new();

    for cap_id in capability_ids {
        let Some(capability) = registry.get(cap_id) else {
            continue;
        };

        if let Some(addition) = capability.system_prompt_addition() {
            prompt_parts.push(addition.to_string());
        }

        for tool in capability.tools() {
            tool_registry.register_boxed(tool);
        }

        applied_ids.push(cap_id.to_string());
    }

    let mut instructions = String::new();
    if !prompt_parts.is_empty() {
        instructions.push_str(&prompt_parts.join("\n\n"));
        instructions.push_str("\n\n");
    }
    instructions.push_str(base_instructions);

    AppliedCapabilities {
        instructions,
        tool_registry,
        applied_ids,
    }
}
