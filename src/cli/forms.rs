//! Terminal driver for [`FormController`]. Prompts each visible field of the
//! current step, advances, and submits on confirmation.

use std::collections::HashMap;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::catalog::{Field, FieldKind};
use crate::cli::output;
use crate::cli::shell::{field_options, render_lines, ChoiceOption, StepView};
use crate::cli::test_mode;
use crate::errors::{CliError, FormError};
use crate::form::{FormController, SubmitOutcome, WizardStatus};
use crate::services::{MutationClient, Navigator, Notifier, Record};

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Value(String),
    /// Keep the current value.
    Keep,
    Cancel,
    /// Go back to the previous field.
    Back,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

/// Everything a prompt needs to render one field.
pub struct PromptContext<'a> {
    pub field: Field,
    pub required: bool,
    pub current: Option<&'a str>,
    pub options: &'a [ChoiceOption],
    pub index: usize,
    pub total: usize,
}

pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn confirm(&mut self, lines: &[String]) -> ConfirmationResponse;
}

/// Lets the user answer a choice by its 1-based index, its label or its value.
pub struct ChoiceMapper {
    values: Vec<String>,
    alias_to_index: HashMap<String, usize>,
}

impl ChoiceMapper {
    pub fn new(options: &[ChoiceOption]) -> Self {
        let mut alias_to_index = HashMap::new();
        for (idx, option) in options.iter().enumerate() {
            alias_to_index.insert((idx + 1).to_string(), idx);
            alias_to_index.insert(option.label.to_ascii_lowercase(), idx);
            alias_to_index.insert(option.value.to_ascii_lowercase(), idx);
        }
        Self {
            values: options.iter().map(|option| option.value.clone()).collect(),
            alias_to_index,
        }
    }

    pub fn resolve(&self, input: &str) -> Option<&str> {
        let key = input.trim().to_ascii_lowercase();
        self.alias_to_index
            .get(&key)
            .and_then(|index| self.values.get(*index))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    Submitted(Record),
    /// The backend refused the last attempt and the user gave up.
    Rejected(String),
    Cancelled,
}

/// Walks the controller through its steps using an interaction.
pub struct WizardRunner<'a> {
    controller: &'a mut FormController,
}

impl<'a> WizardRunner<'a> {
    pub fn new(controller: &'a mut FormController) -> Self {
        Self { controller }
    }

    pub fn run(
        &mut self,
        interaction: &mut dyn FormInteraction,
        client: &mut dyn MutationClient,
        notifier: &mut dyn Notifier,
        navigator: &mut dyn Navigator,
    ) -> Result<WizardOutcome, CliError> {
        let mut field_index = 0;
        // Last backend rejection; values stay in place for a retry.
        let mut rejection: Option<String> = None;
        loop {
            if self.controller.status() != WizardStatus::Open {
                return Ok(WizardOutcome::Cancelled);
            }
            let step = self.controller.current_step();
            let visible = self.controller.visible_fields(step)?;

            if field_index == 0 {
                print_step(self.controller)?;
            }

            if let Some(current) = visible.get(field_index).copied() {
                let options = field_options(self.controller, current.field);
                let response = {
                    let context = PromptContext {
                        field: current.field,
                        required: current.required,
                        current: self.controller.value(current.field),
                        options: &options,
                        index: field_index,
                        total: visible.len(),
                    };
                    interaction.prompt_field(&context)
                };
                match response {
                    PromptResponse::Value(raw) => {
                        let value = if options.is_empty() {
                            raw
                        } else {
                            ChoiceMapper::new(&options)
                                .resolve(&raw)
                                .map(str::to_string)
                                .unwrap_or(raw)
                        };
                        match self.controller.set_field(current.field, value) {
                            Ok(()) => field_index += 1,
                            Err(err) => output::warning(err),
                        }
                    }
                    PromptResponse::Keep => field_index += 1,
                    PromptResponse::Help => print_help(current.field, &options),
                    PromptResponse::Back => {
                        if field_index > 0 {
                            field_index -= 1;
                        } else if step > 0 {
                            self.controller.go_previous()?;
                        }
                    }
                    PromptResponse::Cancel => {
                        self.controller.cancel(navigator)?;
                        output::info("Wizard cancelled.");
                        return Ok(cancelled(rejection));
                    }
                }
                continue;
            }

            if !self.controller.is_last_step() {
                match self.controller.go_next() {
                    Ok(_) => {}
                    Err(FormError::Validation(errors)) => {
                        for err in errors {
                            output::warning(err);
                        }
                    }
                    Err(other) => return Err(other.into()),
                }
                field_index = 0;
                continue;
            }

            match interaction.confirm(&summary_lines(self.controller)) {
                ConfirmationResponse::Confirm => {
                    match self.controller.submit(client, notifier, navigator) {
                        Ok(SubmitOutcome::Submitted(record)) => {
                            return Ok(WizardOutcome::Submitted(record))
                        }
                        Ok(SubmitOutcome::Rejected(err)) => {
                            output::warning(
                                "Nothing was saved. Confirm to resubmit or go back to edit.",
                            );
                            rejection = Some(err.message);
                            continue;
                        }
                        Err(FormError::Validation(errors)) => {
                            for err in errors {
                                output::warning(err);
                            }
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
                ConfirmationResponse::Back => {}
                ConfirmationResponse::Cancel => {
                    self.controller.cancel(navigator)?;
                    output::info("Wizard cancelled.");
                    return Ok(cancelled(rejection));
                }
            }
            field_index = 0;
        }
    }
}

/// A cancel after a backend rejection reports that rejection.
fn cancelled(rejection: Option<String>) -> WizardOutcome {
    match rejection {
        Some(message) => WizardOutcome::Rejected(message),
        None => WizardOutcome::Cancelled,
    }
}

fn print_step(controller: &FormController) -> Result<(), FormError> {
    let view = StepView::from_controller(controller)?;
    let mut lines = render_lines(&view).into_iter();
    if let Some(title) = lines.next() {
        output::section(title);
    }
    for line in lines {
        output::detail(line);
    }
    Ok(())
}

fn print_help(field: Field, options: &[ChoiceOption]) {
    let hint = match field.kind() {
        FieldKind::Decimal => "Enter a number, e.g. 12.5".to_string(),
        FieldKind::Integer => "Enter a whole number".to_string(),
        FieldKind::Date => "Enter a date as YYYY-MM-DD".to_string(),
        FieldKind::Text => "Free text".to_string(),
        FieldKind::Choice(_)
        | FieldKind::Category
        | FieldKind::Discriminator
        | FieldKind::Reference => {
            let listed: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(idx, option)| format!("[{}] {}", idx + 1, option.label))
                .collect();
            format!("Pick one of: {}", listed.join(", "))
        }
    };
    output::detail(format!("{}: {}", field.label(), hint));
}

fn summary_lines(controller: &FormController) -> Vec<String> {
    let mut lines = vec!["Review your entries:".to_string()];
    for index in 0..controller.step_count() {
        let Ok(visible) = controller.visible_fields(index) else {
            continue;
        };
        for entry in visible {
            let value = controller
                .value(entry.field)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or("[unfilled]");
            lines.push(format!("  {}: {}", entry.field.label(), value));
        }
    }
    lines
}

/// Interaction backed by dialoguer prompts.
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl FormInteraction for DialoguerInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        let marker = if context.required { " *" } else { "" };
        let prompt = format!("{}{}", context.field.label(), marker);

        if !context.options.is_empty() {
            let labels: Vec<&str> = context
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect();
            let selected = context
                .current
                .and_then(|current| {
                    context
                        .options
                        .iter()
                        .position(|option| option.value.eq_ignore_ascii_case(current))
                })
                .unwrap_or(0);
            return match Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(&labels)
                .default(selected)
                .interact_opt()
            {
                Ok(Some(index)) => context
                    .options
                    .get(index)
                    .map(|option| PromptResponse::Value(option.value.clone()))
                    .unwrap_or(PromptResponse::Keep),
                Ok(None) if context.index == 0 => PromptResponse::Cancel,
                Ok(None) => PromptResponse::Back,
                Err(_) => PromptResponse::Cancel,
            };
        }

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(current) = context.current.filter(|value| !value.is_empty()) {
            input = input.with_initial_text(current);
        }
        match input.interact_text() {
            Ok(raw) => match raw.trim() {
                ":back" => PromptResponse::Back,
                ":help" => PromptResponse::Help,
                ":cancel" => PromptResponse::Cancel,
                _ => PromptResponse::Value(raw),
            },
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn confirm(&mut self, lines: &[String]) -> ConfirmationResponse {
        for line in lines {
            output::line(line);
        }
        let actions = ["Submit", "Back", "Cancel"];
        match Select::with_theme(&self.theme)
            .with_prompt("Save this entry?")
            .items(&actions)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => ConfirmationResponse::Confirm,
            Ok(Some(1)) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }
}

/// Interaction fed from `AGROTRACE_TEST_INPUTS`.
#[derive(Debug, Default)]
pub struct ScriptedInteraction;

impl FormInteraction for ScriptedInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        test_mode::next_prompt(context.field.label())
    }

    fn confirm(&mut self, lines: &[String]) -> ConfirmationResponse {
        for line in lines {
            output::line(line);
        }
        test_mode::next_confirmation()
    }
}

/// Scripted interaction when test inputs are configured, dialoguer otherwise.
pub fn default_interaction() -> Box<dyn FormInteraction> {
    if test_mode::is_enabled() {
        Box::new(ScriptedInteraction)
    } else {
        Box::new(DialoguerInteraction::new())
    }
}
