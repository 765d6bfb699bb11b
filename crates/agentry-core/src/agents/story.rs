// Story agents
//
// Four flavors of the same idea: baseline and custom produce an outline in a
// single run; advanced and deterministic chain several runs inside a trace.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::hooks::NoopHooks;
use crate::runner::{Agent, Runner};
use crate::tools::{required_str, Tool, ToolExecutionResult, ToolRegistry};
use crate::traces::TraceProcessor;

use super::{error_text, SharedProvider};

fn topic_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "topic": { "type": "string", "description": description }
        },
        "required": ["topic"],
        "additionalProperties": false
    })
}

/// Structured three-part outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryOutline {
    pub introduction: String,
    pub body: String,
    pub conclusion: String,
}

impl StoryOutline {
    fn advanced(topic: &str) -> Self {
        Self {
            introduction: format!(
                "Introduction for '{}': Begin with an evocative setting and compelling characters.",
                topic
            ),
            body: format!(
                "Body for '{}': Develop the conflict and outline the journey with dynamic events.",
                topic
            ),
            conclusion: format!(
                "Conclusion for '{}': Resolve the conflict with a memorable and thoughtful ending.",
                topic
            ),
        }
    }

    fn simple(topic: &str) -> Self {
        Self {
            introduction: format!(
                "Introduction for {}: Introduce main character and setting.",
                topic
            ),
            body: format!(
                "Body for {}: Character faces a challenge or goes on an adventure.",
                topic
            ),
            conclusion: format!(
                "Conclusion for {}: Resolution of the challenge and character's fate.",
                topic
            ),
        }
    }

    /// Outline sections joined into prose
    pub fn expand(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.introduction, self.body, self.conclusion)
    }
}

fn outline_argument(arguments: &Value) -> Result<StoryOutline, ToolExecutionResult> {
    let raw = arguments
        .get("outline")
        .ok_or_else(|| ToolExecutionResult::tool_error("Missing required argument: outline"))?;
    // models sometimes send the outline as an encoded JSON string
    let parsed = match raw {
        Value::String(s) => serde_json::from_str(s),
        other => serde_json::from_value(other.clone()),
    };
    parsed.map_err(|e| ToolExecutionResult::tool_error(format!("Invalid outline: {}", e)))
}

fn outline_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "outline": {
                "type": "object",
                "properties": {
                    "introduction": { "type": "string" },
                    "body": { "type": "string" },
                    "conclusion": { "type": "string" }
                },
                "required": ["introduction", "body", "conclusion"]
            }
        },
        "required": ["outline"]
    })
}

// ============================================================================
// Tools
// ============================================================================

pub struct GenerateStoryOutlineTool;

#[async_trait]
impl Tool for GenerateStoryOutlineTool {
    fn name(&self) -> &str {
        "generate_story_outline"
    }

    fn description(&self) -> &str {
        "Generate a simple story outline for a topic."
    }

    fn parameters_schema(&self) -> Value {
        topic_schema("The topic of the story")
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "topic") {
            Ok(topic) => ToolExecutionResult::success(format!(
                "Outline for {}: Introduction, Body, Conclusion.",
                topic
            )),
            Err(e) => e,
        }
    }
}

pub struct GenerateCustomOutlineTool;

#[async_trait]
impl Tool for GenerateCustomOutlineTool {
    fn name(&self) -> &str {
        "generate_custom_outline"
    }

    fn description(&self) -> &str {
        "Generate a creative, detailed multi-part story outline for a topic."
    }

    fn parameters_schema(&self) -> Value {
        topic_schema("The topic of the story")
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let topic = match required_str(&arguments, "topic") {
            Ok(t) => t,
            Err(e) => return e,
        };
        ToolExecutionResult::success(format!(
            "Custom Story Outline for '{}':\n\
             1. **Introduction:** Set stage with vivid imagery and mood.\n\
             2. **Conflict:** Present a compelling challenge or dilemma.\n\
             3. **Climax:** Build suspense with dynamic, unexpected turns.\n\
             4. **Conclusion:** Deliver a satisfying resolution that inspires reflection.",
            topic
        ))
    }
}

pub struct GenerateAdvancedOutlineTool;

#[async_trait]
impl Tool for GenerateAdvancedOutlineTool {
    fn name(&self) -> &str {
        "generate_advanced_outline"
    }

    fn description(&self) -> &str {
        "Generate a structured outline with introduction, body and conclusion."
    }

    fn parameters_schema(&self) -> Value {
        topic_schema("The topic or theme for the story")
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "topic") {
            Ok(topic) => match serde_json::to_value(StoryOutline::advanced(topic)) {
                Ok(v) => ToolExecutionResult::success(v),
                Err(e) => ToolExecutionResult::internal_error(e),
            },
            Err(e) => e,
        }
    }
}

pub struct GenerateAdvancedStoryBodyTool;

#[async_trait]
impl Tool for GenerateAdvancedStoryBodyTool {
    fn name(&self) -> &str {
        "generate_advanced_story_body"
    }

    fn description(&self) -> &str {
        "Expand a structured outline into a complete story."
    }

    fn parameters_schema(&self) -> Value {
        outline_schema()
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match outline_argument(&arguments) {
            Ok(outline) => ToolExecutionResult::success(outline.expand()),
            Err(e) => e,
        }
    }
}

pub struct GenerateOutlineTool;

#[async_trait]
impl Tool for GenerateOutlineTool {
    fn name(&self) -> &str {
        "generate_outline"
    }

    fn description(&self) -> &str {
        "Generate a story outline based on the user's topic."
    }

    fn parameters_schema(&self) -> Value {
        topic_schema("The topic or theme for the story")
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "topic") {
            Ok(topic) => match serde_json::to_value(StoryOutline::simple(topic)) {
                Ok(v) => ToolExecutionResult::success(v),
                Err(e) => ToolExecutionResult::internal_error(e),
            },
            Err(e) => e,
        }
    }
}

pub struct GenerateStoryTool;

#[async_trait]
impl Tool for GenerateStoryTool {
    fn name(&self) -> &str {
        "generate_story"
    }

    fn description(&self) -> &str {
        "Write the story body (without the ending) from an outline."
    }

    fn parameters_schema(&self) -> Value {
        outline_schema()
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match outline_argument(&arguments) {
            Ok(outline) => {
                ToolExecutionResult::success(format!("{}\n\n{}", outline.introduction, outline.body))
            }
            Err(e) => e,
        }
    }
}

pub struct GenerateEndingTool;

#[async_trait]
impl Tool for GenerateEndingTool {
    fn name(&self) -> &str {
        "generate_ending"
    }

    fn description(&self) -> &str {
        "Append an ending to a story."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "story": { "type": "string", "description": "The story text without an ending" }
            },
            "required": ["story"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        match required_str(&arguments, "story") {
            Ok(story) => ToolExecutionResult::success(format!(
                "{}.\n\nAnd they all lived happily ever after. The End.",
                story
            )),
            Err(e) => e,
        }
    }
}

// ============================================================================
// StoryAgents
// ============================================================================

pub struct StoryAgents {
    provider: SharedProvider,
    traces: TraceProcessor,
    baseline: Agent,
    custom: Agent,
    advanced: Agent,
    outline: Agent,
    story: Agent,
    ending: Agent,
}

impl StoryAgents {
    pub fn new(provider: SharedProvider, model: &str, traces: TraceProcessor) -> Self {
        let agent = |name: &str, instructions: &str, tools: ToolRegistry| {
            Agent::new(name, instructions)
                .with_model(model)
                .with_tools(tools)
        };

        Self {
            baseline: agent(
                "StoryDeterministicAgent",
                "Based on the provided topic, generate a story outline deterministically using the given tool.",
                ToolRegistry::builder().tool(GenerateStoryOutlineTool).build(),
            ),
            custom: agent(
                "CustomStoryAgent",
                "Generate a creative and detailed story outline with enhanced narrative flair.",
                ToolRegistry::builder().tool(GenerateCustomOutlineTool).build(),
            ),
            advanced: agent(
                "AdvancedStoryAgent",
                "Generate a complete story by first creating a detailed outline and then expanding it into a full narrative. \
                 The outline should include an evocative introduction, a dynamic body, and a satisfying conclusion.",
                ToolRegistry::builder()
                    .tool(GenerateAdvancedOutlineTool)
                    .tool(GenerateAdvancedStoryBodyTool)
                    .build(),
            ),
            outline: agent(
                "StoryOutlineAgent",
                "Generate a very short story outline based on the user's input.",
                ToolRegistry::builder().tool(GenerateOutlineTool).build(),
            ),
            story: agent(
                "StoryAgent",
                "Write a short story based on the given outline.",
                ToolRegistry::builder().tool(GenerateStoryTool).build(),
            ),
            ending: agent(
                "EndingAgent",
                "Write a short ending based on the given story.",
                ToolRegistry::builder().tool(GenerateEndingTool).build(),
            ),
            provider,
            traces,
        }
    }

    async fn single(&self, agent: &Agent, topic: &str, empty: &str) -> String {
        let runner = Runner::new(self.provider.clone());
        match runner.run(agent, topic, &NoopHooks).await {
            Ok(result) if !result.final_output.is_empty() => result.final_output,
            Ok(_) => empty.to_string(),
            Err(e) => error_text(e),
        }
    }

    pub async fn run_baseline(&self, topic: &str) -> String {
        self.single(&self.baseline, topic, "Error: No output from the agent.")
            .await
    }

    pub async fn run_custom(&self, topic: &str) -> String {
        self.single(&self.custom, topic, "Error: No output from custom agent.")
            .await
    }

    /// Outline then expansion, traced as "Advanced Story Flow"
    pub async fn run_advanced(&self, topic: &str) -> String {
        let trace = self.traces.start_trace("Advanced Story Flow");
        trace.set_metadata("topic", topic);
        let runner = Runner::new(self.provider.clone()).with_trace(trace.clone());

        let steps = [
            (&self.advanced, "Error: No output from advanced outline generation."),
            (&self.advanced, "Error: No output from advanced story body generation."),
        ];
        let output = self.chain(&runner, topic, &steps).await;
        trace.finish();
        output
    }

    /// Outline, story and ending agents in strict order, traced as "Deterministic Story Flow"
    pub async fn run_deterministic(&self, topic: &str) -> String {
        let trace = self.traces.start_trace("Deterministic Story Flow");
        trace.set_metadata("topic", topic);
        let runner = Runner::new(self.provider.clone()).with_trace(trace.clone());

        let steps = [
            (&self.outline, "Error: Outline generation failed."),
            (&self.story, "Error: Story generation failed."),
            (&self.ending, "Error: Ending generation failed."),
        ];
        let output = self.chain(&runner, topic, &steps).await;
        trace.finish();
        output
    }

    async fn chain(
        &self,
        runner: &Runner<SharedProvider>,
        input: &str,
        steps: &[(&Agent, &str)],
    ) -> String {
        let mut current = input.to_string();
        for (agent, empty) in steps {
            match runner.run(agent, &current, &NoopHooks).await {
                Ok(result) if !result.final_output.is_empty() => current = result.final_output,
                Ok(_) => return empty.to_string(),
                Err(e) => return error_text(e),
            }
        }
        current
    }
}
