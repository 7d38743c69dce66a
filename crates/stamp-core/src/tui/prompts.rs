//! Charm-style terminal prompts using cliclack

use crate::error::{Error, Result};
use crate::prompt::{AnswerSource, PromptDefinition};

/// Answer source that asks the user on the terminal.
///
/// Validation stays in the prompt engine; a rejected answer is shown as a
/// cliclack warning and the question is asked again.
#[derive(Debug, Default)]
pub struct InteractiveAnswers;

impl InteractiveAnswers {
    pub fn new() -> Self {
        Self
    }
}

impl AnswerSource for InteractiveAnswers {
    fn ask(&mut self, prompt: &PromptDefinition, default: &str) -> Result<String> {
        let mut input = cliclack::input(&prompt.message);
        if !default.is_empty() {
            input = input.default_input(default);
        } else if !prompt.required {
            input = input.required(false);
        }
        let answer: String = input.interact().map_err(|e| Error::PromptValidation {
            key: prompt.key.clone(),
            message: e.to_string(),
        })?;
        Ok(answer)
    }

    fn interactive(&self) -> bool {
        true
    }

    fn reject(&mut self, message: &str) {
        let _ = cliclack::log::warning(message);
    }
}
