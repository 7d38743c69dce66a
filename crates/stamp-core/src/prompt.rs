//! Ordered interactive prompts declared by a template
//!
//! Questions run strictly in order, one at a time. Accepted answers are
//! merged into the metadata immediately, so later prompts can reference
//! earlier answers in their visibility predicates and defaults.

use crate::error::{Error, Result};
use crate::render;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One question from a template descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Metadata key the answer is stored under
    pub key: String,

    /// Question presented to the user
    pub message: String,

    /// Default answer; may reference earlier answers with placeholders
    #[serde(default)]
    pub default: Option<String>,

    /// Reject empty answers
    #[serde(default)]
    pub required: bool,

    /// Regex the whole answer must match
    #[serde(default)]
    pub pattern: Option<String>,

    /// Visibility predicate over prior answers: `key`, `key=value` or
    /// `key!=value`
    #[serde(default)]
    pub when: Option<String>,
}

impl PromptDefinition {
    /// Apply the validator; `Err` carries the human-readable reason
    pub fn validate(&self, answer: &str) -> std::result::Result<(), String> {
        if self.required && answer.trim().is_empty() {
            return Err("an answer is required".to_string());
        }
        if let Some(pattern) = &self.pattern {
            let re = Regex::new(&format!("^(?:{})$", pattern))
                .map_err(|e| format!("template declares an invalid pattern: {}", e))?;
            if !re.is_match(answer) {
                return Err(format!("answer must match pattern \"{}\"", pattern));
            }
        }
        Ok(())
    }

    /// Evaluate the visibility predicate against the metadata so far
    pub fn is_visible(&self, metadata: &Map<String, Value>) -> bool {
        let Some(when) = &self.when else { return true };
        if let Some((key, expected)) = when.split_once("!=") {
            return value_as_string(metadata.get(key.trim())) != expected.trim();
        }
        if let Some((key, expected)) = when.split_once('=') {
            return value_as_string(metadata.get(key.trim())) == expected.trim();
        }
        is_truthy(metadata.get(when.trim()))
    }
}

fn value_as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !matches!(s.as_str(), "" | "false" | "no" | "0"),
        _ => false,
    }
}

/// Where answers come from
///
/// The cliclack implementation lives behind the `tui` feature; scripted
/// sources cover non-interactive callers and tests.
pub trait AnswerSource {
    /// Present one question and return the raw answer
    fn ask(&mut self, prompt: &PromptDefinition, default: &str) -> Result<String>;

    /// Interactive sources get re-asked after a rejected answer
    fn interactive(&self) -> bool {
        false
    }

    /// Notification that the previous answer was rejected
    fn reject(&mut self, _message: &str) {}
}

/// Non-interactive answer source backed by a fixed answer map
///
/// Missing keys fall back to the prompt's default.
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: HashMap<String, String>,
}

impl ScriptedAnswers {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    pub fn insert(&mut self, key: &str, answer: &str) {
        self.answers.insert(key.to_string(), answer.to_string());
    }
}

impl AnswerSource for ScriptedAnswers {
    fn ask(&mut self, prompt: &PromptDefinition, default: &str) -> Result<String> {
        Ok(self
            .answers
            .get(&prompt.key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }
}

/// Run every visible prompt in order, folding answers into `metadata`
pub fn run(
    prompts: &[PromptDefinition],
    metadata: &mut Map<String, Value>,
    source: &mut dyn AnswerSource,
) -> Result<()> {
    for prompt in prompts {
        if !prompt.is_visible(metadata) {
            continue;
        }
        let default = resolve_default(prompt, metadata)?;
        loop {
            let answer = source.ask(prompt, &default)?;
            match prompt.validate(&answer) {
                Ok(()) => {
                    metadata.insert(prompt.key.clone(), Value::String(answer));
                    break;
                }
                Err(message) if source.interactive() => {
                    source.reject(&message);
                }
                Err(message) => {
                    return Err(Error::PromptValidation {
                        key: prompt.key.clone(),
                        message,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Defaults may reference earlier answers through placeholder syntax
fn resolve_default(prompt: &PromptDefinition, metadata: &Map<String, Value>) -> Result<String> {
    let Some(default) = &prompt.default else {
        return Ok(String::new());
    };
    if !default.contains("{{") {
        return Ok(default.clone());
    }
    render::render_str(default, metadata).map_err(|message| Error::PromptValidation {
        key: prompt.key.clone(),
        message: format!("template declares an invalid default: {}", message),
    })
}
