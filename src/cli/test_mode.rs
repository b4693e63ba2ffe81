//! Scripted answers for non-interactive runs. When `AGROTRACE_TEST_INPUTS`
//! is set, wizard prompts read `|`-separated tokens from it instead of the
//! terminal.

use once_cell::sync::Lazy;
use std::{collections::VecDeque, env, sync::Mutex};

use crate::cli::forms::{ConfirmationResponse, PromptResponse};

pub const INPUTS_ENV: &str = "AGROTRACE_TEST_INPUTS";

struct InputQueue {
    enabled: bool,
    inputs: VecDeque<String>,
}

impl InputQueue {
    fn from_env() -> Self {
        match env::var(INPUTS_ENV) {
            Ok(raw) => Self {
                enabled: true,
                inputs: parse_sequence(&raw),
            },
            Err(_) => Self {
                enabled: false,
                inputs: VecDeque::new(),
            },
        }
    }
}

static INPUTS: Lazy<Mutex<InputQueue>> = Lazy::new(|| Mutex::new(InputQueue::from_env()));

pub fn is_enabled() -> bool {
    INPUTS.lock().map(|guard| guard.enabled).unwrap_or(false)
}

fn next_token(label: &str) -> Option<String> {
    let mut guard = INPUTS.lock().ok()?;
    let token = guard.inputs.pop_front();
    if token.is_none() {
        tracing::warn!(prompt = label, "scripted inputs exhausted");
    }
    token
}

/// Next scripted answer for a field prompt. Running out cancels the wizard.
pub fn next_prompt(label: &str) -> PromptResponse {
    match next_token(label) {
        Some(token) => parse_prompt(&token),
        None => PromptResponse::Cancel,
    }
}

pub fn next_confirmation() -> ConfirmationResponse {
    match next_token("confirm") {
        Some(token) => parse_confirmation(&token),
        None => ConfirmationResponse::Cancel,
    }
}

fn parse_prompt(token: &str) -> PromptResponse {
    match token.to_ascii_uppercase().as_str() {
        "<CANCEL>" | "<ESC>" => PromptResponse::Cancel,
        "<BACK>" => PromptResponse::Back,
        "<HELP>" => PromptResponse::Help,
        "<KEEP>" => PromptResponse::Keep,
        "<BLANK>" | "<EMPTY>" => PromptResponse::Value(String::new()),
        _ => PromptResponse::Value(token.to_string()),
    }
}

fn parse_confirmation(token: &str) -> ConfirmationResponse {
    match token.to_ascii_uppercase().as_str() {
        "<CONFIRM>" | "<SUBMIT>" | "Y" | "YES" => ConfirmationResponse::Confirm,
        "<BACK>" => ConfirmationResponse::Back,
        _ => ConfirmationResponse::Cancel,
    }
}

fn parse_sequence(raw: &str) -> VecDeque<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_map_to_responses() {
        assert_eq!(parse_prompt("<keep>"), PromptResponse::Keep);
        assert_eq!(parse_prompt("<BLANK>"), PromptResponse::Value(String::new()));
        assert_eq!(parse_prompt("12.5"), PromptResponse::Value("12.5".into()));
        assert_eq!(parse_confirmation("yes"), ConfirmationResponse::Confirm);
        assert_eq!(parse_confirmation("<back>"), ConfirmationResponse::Back);
    }

    #[test]
    fn sequence_skips_empty_segments() {
        let parsed = parse_sequence("FR| -2 ||<KEEP>|");
        assert_eq!(parsed, VecDeque::from(vec!["FR".to_string(), "-2".into(), "<KEEP>".into()]));
    }
}
