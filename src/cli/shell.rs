//! Presentation model for the current wizard step. Rendering is plain text;
//! the CLI colors the lines when printing them.

use crate::catalog::{EventCategory, Field, FieldKind};
use crate::errors::FormError;
use crate::form::FormController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Submit,
}

/// Selectable option: what is shown and what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub field: Field,
    pub label: &'static str,
    pub value: Option<String>,
    pub required: bool,
    pub error: Option<String>,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub title: &'static str,
    pub description: &'static str,
    pub index: usize,
    pub total: usize,
    pub fields: Vec<FieldRow>,
    pub can_go_back: bool,
    pub primary: PrimaryAction,
    /// A submission is in flight; inputs and actions are disabled.
    pub busy: bool,
}

impl StepView {
    pub fn from_controller(controller: &FormController) -> Result<Self, FormError> {
        let index = controller.current_step();
        let step = controller.step(index)?;
        let fields = controller
            .visible_fields(index)?
            .into_iter()
            .map(|visible| FieldRow {
                field: visible.field,
                label: visible.field.label(),
                value: controller
                    .value(visible.field)
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_string),
                required: visible.required,
                error: controller
                    .error(visible.field)
                    .map(|err| err.message.clone()),
                options: field_options(controller, visible.field),
            })
            .collect();
        Ok(Self {
            title: step.title,
            description: step.description,
            index,
            total: controller.step_count(),
            fields,
            can_go_back: index > 0,
            primary: if controller.is_last_step() {
                PrimaryAction::Submit
            } else {
                PrimaryAction::Next
            },
            busy: controller.is_submitting(),
        })
    }

    pub fn progress(&self) -> String {
        format!("Step {} of {}", self.index + 1, self.total)
    }
}

/// Options a field offers given the controller's current state.
pub fn field_options(controller: &FormController, field: Field) -> Vec<ChoiceOption> {
    match field.kind() {
        FieldKind::Choice(options) => options
            .iter()
            .map(|option| ChoiceOption {
                label: option.to_string(),
                value: option.to_string(),
            })
            .collect(),
        FieldKind::Category => EventCategory::ALL
            .iter()
            .map(|category| ChoiceOption {
                label: category.label().to_string(),
                value: category.as_str().to_string(),
            })
            .collect(),
        FieldKind::Discriminator => match controller.state().category {
            Some(category) => controller
                .catalog()
                .descriptors(category)
                .into_iter()
                .map(|descriptor| ChoiceOption {
                    label: format!("{} ({})", descriptor.name, descriptor.code),
                    value: descriptor.code.to_string(),
                })
                .collect(),
            None => Vec::new(),
        },
        FieldKind::Reference => controller
            .options(field)
            .unwrap_or_default()
            .iter()
            .map(|option| ChoiceOption {
                label: option.clone(),
                value: option.clone(),
            })
            .collect(),
        FieldKind::Text | FieldKind::Decimal | FieldKind::Integer | FieldKind::Date => Vec::new(),
    }
}

pub fn render_lines(view: &StepView) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", view.title, view.progress())];
    if !view.description.is_empty() {
        lines.push(view.description.to_string());
    }
    for row in &view.fields {
        let marker = if row.required { " *" } else { "" };
        let value = row.value.as_deref().unwrap_or("-");
        lines.push(format!("  {}{}: {}", row.label, marker, value));
        if let Some(error) = &row.error {
            lines.push(format!("    ! {}", error));
        }
    }
    let mut actions = Vec::new();
    if view.can_go_back {
        actions.push("[Back]");
    }
    actions.push(match (view.busy, view.primary) {
        (true, _) => "[Submitting...]",
        (false, PrimaryAction::Next) => "[Next]",
        (false, PrimaryAction::Submit) => "[Submit]",
    });
    lines.push(actions.join(" "));
    lines
}
