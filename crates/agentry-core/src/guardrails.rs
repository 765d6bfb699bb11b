// Input and output guardrails
//
// A guardrail inspects text and reports whether its tripwire fired. The
// runner checks input guardrails before the first model call and output
// guardrails on the final output; any tripwire aborts the run.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const MAX_INPUT_CHARS: usize = 4000;
pub const MAX_OUTPUT_CHARS: usize = 8000;

const HARMFUL_TERMS: &[&str] = &[
    "kill",
    "murder",
    "bomb",
    "explosive",
    "weapon",
    "terrorist",
    "suicide",
    "self-harm",
    "poison",
];

const PROFANITY: &[&str] = &[
    "damn", "shit", "fuck", "fucking", "bitch", "bastard", "asshole", "crap",
];

/// Result of a single guardrail check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardrailOutput {
    pub tripwire_triggered: bool,
    pub output_info: Value,
}

impl GuardrailOutput {
    pub fn pass() -> Self {
        Self {
            tripwire_triggered: false,
            output_info: json!({ "message": "ok" }),
        }
    }

    pub fn trip(message: impl Into<String>) -> Self {
        Self {
            tripwire_triggered: true,
            output_info: json!({ "message": message.into() }),
        }
    }

    pub fn message(&self) -> &str {
        self.output_info
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

pub trait Guardrail: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, text: &str) -> GuardrailOutput;
}

/// Guardrail backed by a plain function
#[derive(Clone, Copy)]
pub struct FnGuardrail {
    name: &'static str,
    check: fn(&str) -> GuardrailOutput,
}

impl FnGuardrail {
    pub const fn new(name: &'static str, check: fn(&str) -> GuardrailOutput) -> Self {
        Self { name, check }
    }
}

impl Guardrail for FnGuardrail {
    fn name(&self) -> &str {
        self.name
    }

    fn check(&self, text: &str) -> GuardrailOutput {
        (self.check)(text)
    }
}

impl std::fmt::Debug for FnGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnGuardrail").field("name", &self.name).finish()
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

// ============================================================================
// Input guardrails
// ============================================================================

pub fn validate_empty_input(text: &str) -> GuardrailOutput {
    if text.trim().is_empty() {
        GuardrailOutput::trip("Input cannot be empty")
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_input_length(text: &str) -> GuardrailOutput {
    if text.chars().count() > MAX_INPUT_CHARS {
        GuardrailOutput::trip(format!(
            "Input exceeds maximum length of {} characters",
            MAX_INPUT_CHARS
        ))
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_harmful_content(text: &str) -> GuardrailOutput {
    if words(text).any(|w| HARMFUL_TERMS.contains(&w.as_str())) {
        GuardrailOutput::trip("Input contains potentially harmful content")
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_inappropriate_language(text: &str) -> GuardrailOutput {
    if words(text).any(|w| PROFANITY.contains(&w.as_str())) {
        GuardrailOutput::trip("Input contains inappropriate language")
    } else {
        GuardrailOutput::pass()
    }
}

// ============================================================================
// Output guardrails
// ============================================================================

pub fn validate_output_not_empty(text: &str) -> GuardrailOutput {
    if text.trim().is_empty() {
        GuardrailOutput::trip("Output cannot be empty")
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_output_length(text: &str) -> GuardrailOutput {
    if text.chars().count() > MAX_OUTPUT_CHARS {
        GuardrailOutput::trip(format!(
            "Output exceeds maximum length of {} characters",
            MAX_OUTPUT_CHARS
        ))
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_no_error_in_output(text: &str) -> GuardrailOutput {
    let trimmed = text.trim_start();
    if trimmed.starts_with("Error") || text.to_lowercase().contains("internal error") {
        GuardrailOutput::trip("Output contains an error message")
    } else {
        GuardrailOutput::pass()
    }
}

pub fn validate_output_format(text: &str) -> GuardrailOutput {
    if text.matches("```").count() % 2 != 0 {
        return GuardrailOutput::trip("Output has an unterminated code block");
    }

    let trimmed = text.trim();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<Value>(trimmed).is_err()
    {
        return GuardrailOutput::trip("Output looks like JSON but is not valid JSON");
    }

    GuardrailOutput::pass()
}

pub fn default_input_guardrails() -> Vec<Arc<dyn Guardrail>> {
    vec![
        Arc::new(FnGuardrail::new("validate_empty_input", validate_empty_input)),
        Arc::new(FnGuardrail::new("validate_input_length", validate_input_length)),
        Arc::new(FnGuardrail::new("validate_harmful_content", validate_harmful_content)),
        Arc::new(FnGuardrail::new(
            "validate_inappropriate_language",
            validate_inappropriate_language,
        )),
    ]
}

pub fn default_output_guardrails() -> Vec<Arc<dyn Guardrail>> {
    vec![
        Arc::new(FnGuardrail::new("validate_output_not_empty", validate_output_not_empty)),
        Arc::new(FnGuardrail::new("validate_output_length", validate_output_length)),
        Arc::new(FnGuardrail::new("validate_no_error_in_output", validate_no_error_in_output)),
        Arc::new(FnGuardrail::new("validate_output_format", validate_output_format)),
    ]
}
