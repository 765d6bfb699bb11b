// Provider/model recommendation
//
// Pure lookup: task type and prompt length pick a provider, then the provider
// and task type pick a model.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::types::ResponseStatus;

pub const DEFAULT_PROMPT_LENGTH: i64 = 100;
const FALLBACK_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    /// reasoning, conversation, creative or code; anything else uses defaults
    #[serde(default)]
    pub task_type: Option<String>,
    /// Prompt length in characters
    #[serde(default)]
    pub prompt_length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub status: ResponseStatus,
    pub recommended_provider: String,
    pub model: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
}

impl LengthBucket {
    /// Buckets by estimated tokens (four characters each). Lengths below
    /// zero count as short.
    pub fn from_chars(chars: i64) -> Self {
        match chars.div_euclid(4) {
            t if t < 500 => LengthBucket::Short,
            t if t < 2000 => LengthBucket::Medium,
            _ => LengthBucket::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthBucket::Short => "short",
            LengthBucket::Medium => "medium",
            LengthBucket::Long => "long",
        }
    }
}

fn pick_provider(task: &str, bucket: LengthBucket) -> &'static str {
    use LengthBucket::*;
    match (task, bucket) {
        ("reasoning", Long) | ("code", Long) => "openrouter",
        ("conversation", Medium) | ("conversation", Long) => "gemini",
        ("creative", Long) => "gemini",
        _ => "openai",
    }
}

fn pick_model(provider: &str, task: &str) -> &'static str {
    match (provider, task) {
        ("openai", "reasoning" | "creative" | "code") => "gpt-4o",
        ("openai", _) => "gpt-4o-mini",
        ("gemini", "reasoning" | "creative") => "gemini-2.0-pro-exp-02-05",
        ("gemini", _) => "gemini-1.5-pro",
        ("requestry", "reasoning" | "creative" | "code") => "cline/4o-mini",
        ("requestry", _) => "cline/o3-mini",
        ("openrouter", "reasoning" | "creative" | "code") => "openai/gpt-4o",
        ("openrouter", _) => "openai/gpt-4o-mini",
        _ => FALLBACK_MODEL,
    }
}

/// Recommend a provider and model
pub fn recommend(request: &RecommendationRequest) -> Recommendation {
    let task = request
        .task_type
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let length = request.prompt_length.unwrap_or(DEFAULT_PROMPT_LENGTH);

    let bucket = LengthBucket::from_chars(length);
    let provider = pick_provider(&task, bucket);
    let model = pick_model(provider, &task);
    debug!(task = %task, bucket = bucket.as_str(), provider, model, "Recommended model");

    Recommendation {
        status: ResponseStatus::Success,
        recommended_provider: provider.to_string(),
        model: model.to_string(),
        message: format!(
            "Based on {} task and {} characters ({} length)",
            task,
            length,
            bucket.as_str()
        ),
    }
}
