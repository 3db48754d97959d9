use std::collections::VecDeque;
use std::io::IsTerminal;

use dialoguer::{Confirm, Input};
use netedit_engine::{
    Answer, Click, ClickMode, DialogRequest, DialogValues, FieldValue, StepResult,
};

use crate::error::{CliError, Result};

/// Supplies answers to suspended operations.
///
/// `Ok(None)` means no answer will come: the caller abandons the operation.
pub(crate) trait AnswerSource {
    fn answer(&mut self, operation: &'static str, request: &StepResult) -> Result<Option<Answer>>;
}

/// Answers taken in order from a script step.
#[derive(Debug, Default)]
pub(crate) struct ScriptedAnswers {
    queue: VecDeque<Answer>,
}

impl ScriptedAnswers {
    pub(crate) fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            queue: answers.into_iter().collect(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl AnswerSource for ScriptedAnswers {
    fn answer(&mut self, _operation: &'static str, _request: &StepResult) -> Result<Option<Answer>> {
        Ok(self.queue.pop_front())
    }
}

/// Answers prompted for on the terminal.
pub(crate) struct TerminalAnswers;

impl TerminalAnswers {
    pub(crate) fn new() -> Result<Self> {
        if !is_interactive() {
            return Err(CliError::NotATty);
        }
        Ok(Self)
    }
}

impl AnswerSource for TerminalAnswers {
    fn answer(&mut self, operation: &'static str, request: &StepResult) -> Result<Option<Answer>> {
        let answer = match request {
            StepResult::NeedConfirmation(message) => Confirm::new()
                .with_prompt(format!("[{operation}] {message}"))
                .default(false)
                .interact_opt()?
                .map_or(Answer::NoResults, Answer::Confirm),
            StepResult::NeedDialog(dialog) => prompt_dialog(operation, dialog)?,
            StepResult::NeedClick(mode) => prompt_click(operation, *mode)?,
            _ => return Ok(None),
        };
        Ok(Some(answer))
    }
}

fn is_interactive() -> bool {
    std::env::var("NETEDIT_FORCE_TTY").is_ok() || std::io::stdin().is_terminal()
}

fn prompt_dialog(operation: &str, dialog: &DialogRequest) -> Result<Answer> {
    println!("[{operation}] {}", dialog.title);
    let mut values = DialogValues::new();
    for (key, default) in dialog.fields.iter() {
        let value = match default {
            FieldValue::Flag(flag) => {
                let Some(flag) = Confirm::new()
                    .with_prompt(key)
                    .default(*flag)
                    .interact_opt()?
                else {
                    return Ok(Answer::NoResults);
                };
                FieldValue::Flag(flag)
            }
            other => {
                let text: String = Input::new()
                    .with_prompt(key)
                    .with_initial_text(other.to_string())
                    .allow_empty(true)
                    .interact_text()?;
                FieldValue::Text(text)
            }
        };
        values.insert(key, value);
    }
    Ok(Answer::Dialog(values))
}

fn prompt_click(operation: &str, mode: ClickMode) -> Result<Answer> {
    let text: String = Input::new()
        .with_prompt(format!("[{operation}] {mode}: x,y (empty to cancel)"))
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() || parse_point(input).is_some() {
                Ok(())
            } else {
                Err("expected two numbers separated by a comma")
            }
        })
        .interact_text()?;
    Ok(parse_point(&text).map_or(Answer::NoResults, |(x, y)| Answer::Click(Click::at(x, y))))
}

fn parse_point(text: &str) -> Option<(f64, f64)> {
    let (x, y) = text.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
