// Agentry LLM providers
//
// Adapters that send a single prompt to a hosted model and map the answer to
// a ProviderResponse. Failures are reported in the response (status "error")
// so callers always get a normalized body.

use async_trait::async_trait;

pub mod client;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod openrouter;
pub mod recommender;
pub mod requestry;
pub mod types;

pub use error::{ProviderError, Result};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use openrouter::OpenRouterProvider;
pub use recommender::{recommend, Recommendation, RecommendationRequest};
pub use requestry::RequestryProvider;
pub use types::{PromptRequest, ProviderResponse, ResponseStatus, Usage};

/// A hosted model reachable with a single prompt
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Short provider id ("openai", "gemini", ...)
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    /// Never fails: errors come back with `status: "error"`
    async fn process_prompt(&self, request: &PromptRequest) -> ProviderResponse;
}
