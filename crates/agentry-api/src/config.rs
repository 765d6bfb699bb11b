// Server configuration loaded from environment variables.
// Decision: Missing provider keys are warnings, not startup failures
// Decision: Unknown ORCHESTRATION_MODE values fall back to DEVELOPMENT

use std::fmt;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TRACE_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_AGENT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENROUTER_TITLE: &str = "OpenAI Agents Module 4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestrationMode {
    #[default]
    Development,
    Production,
}

impl OrchestrationMode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PRODUCTION" => OrchestrationMode::Production,
            _ => OrchestrationMode::Development,
        }
    }
}

impl fmt::Display for OrchestrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationMode::Development => write!(f, "DEVELOPMENT"),
            OrchestrationMode::Production => write!(f, "PRODUCTION"),
        }
    }
}

#[derive(Clone, Default)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub requestry_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    /// Shared secret expected in `X-API-KEY`
    pub api_key: Option<String>,
    pub trace_log_level: String,
    pub orchestration_mode: OrchestrationMode,
    pub openrouter_referer: Option<String>,
    pub openrouter_title: String,
    /// Model used by every runner-driven agent
    pub agent_model: String,
    /// Full chat-completions URL override for the runner's driver
    pub openai_base_url: Option<String>,
    pub api_prefix: String,
    pub bind_addr: String,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            requestry_api_key: get("REQUESTRY_API_KEY"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            api_key: get("API_KEY"),
            trace_log_level: get("TRACE_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_TRACE_LOG_LEVEL.to_string()),
            orchestration_mode: get("ORCHESTRATION_MODE")
                .map(|s| OrchestrationMode::parse(&s))
                .unwrap_or_default(),
            openrouter_referer: get("OPENROUTER_REFERER"),
            openrouter_title: get("OPENROUTER_TITLE")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_TITLE.to_string()),
            agent_model: get("AGENT_MODEL").unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL"),
            api_prefix: get("API_PREFIX").unwrap_or_default(),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Tracing filter directive derived from TRACE_LOG_LEVEL
    pub fn log_filter(&self) -> String {
        let level = self.trace_log_level.to_lowercase();
        ["agentry_api", "agentry_core", "agentry_providers", "tower_http"]
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Warn about every missing key so misconfiguration shows up at startup
    pub fn log_warnings(&self) {
        let providers = [
            ("OPENAI_API_KEY", &self.openai_api_key, "OpenAI provider and all runner-backed agents"),
            ("GEMINI_API_KEY", &self.gemini_api_key, "Gemini provider"),
            ("REQUESTRY_API_KEY", &self.requestry_api_key, "Requestry provider"),
            ("OPENROUTER_API_KEY", &self.openrouter_api_key, "OpenRouter provider"),
        ];
        for (var, value, affected) in providers {
            if value.is_none() {
                tracing::warn!("{} not set. {} will not work.", var, affected);
            }
        }
        if self.api_key.is_none() {
            tracing::warn!("API_KEY not set. Protected endpoints will reject all requests.");
        }
        tracing::info!(mode = %self.orchestration_mode, "Orchestration mode");
        tracing::info!(level = %self.trace_log_level, "Trace log level");
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "[SET]" } else { "[UNSET]" };
        f.debug_struct("AppConfig")
            .field("openai_api_key", &set(&self.openai_api_key))
            .field("gemini_api_key", &set(&self.gemini_api_key))
            .field("requestry_api_key", &set(&self.requestry_api_key))
            .field("openrouter_api_key", &set(&self.openrouter_api_key))
            .field("api_key", &set(&self.api_key))
            .field("trace_log_level", &self.trace_log_level)
            .field("orchestration_mode", &self.orchestration_mode)
            .field("agent_model", &self.agent_model)
            .field("api_prefix", &self.api_prefix)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert!(config.api_key.is_none());
        assert_eq!(config.trace_log_level, "INFO");
        assert_eq!(config.orchestration_mode, OrchestrationMode::Development);
        assert_eq!(config.openrouter_title, "OpenAI Agents Module 4");
        assert_eq!(config.agent_model, "gpt-4o-mini");
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_orchestration_mode_fallback() {
        assert_eq!(
            config(&[("ORCHESTRATION_MODE", "production")]).orchestration_mode,
            OrchestrationMode::Production
        );
        assert_eq!(
            config(&[("ORCHESTRATION_MODE", "STAGING")]).orchestration_mode,
            OrchestrationMode::Development
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config(&[("API_KEY", ""), ("OPENAI_API_KEY", "  ")]);
        assert!(config.api_key.is_none());
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_log_filter_and_cors() {
        let config = config(&[
            ("TRACE_LOG_LEVEL", "DEBUG"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ]);
        assert_eq!(
            config.log_filter(),
            "agentry_api=debug,agentry_core=debug,agentry_providers=debug,tower_http=debug"
        );
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = config(&[("API_KEY", "secret-value")]);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("[SET]"));
    }
}
