use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::{EventCategory, Field};
use crate::errors::ValidationError;
use crate::form::FormState;
use crate::submission::Resource;

/// Extra completion check run after a step's required fields pass.
pub type StepRule = Arc<dyn Fn(&FormState) -> Result<(), ValidationError> + Send + Sync>;

/// Which fields a step renders.
#[derive(Debug, Clone, PartialEq)]
pub enum StepFields {
    Fixed {
        required: Vec<Field>,
        optional: Vec<Field>,
    },
    /// Fields of the active event type descriptor. `include_type` renders the
    /// type selector as part of the step.
    Descriptor { include_type: bool },
}

#[derive(Clone)]
pub struct WizardStep {
    pub title: &'static str,
    pub description: &'static str,
    pub fields: StepFields,
    rule: Option<StepRule>,
}

impl WizardStep {
    pub fn fixed(title: &'static str, description: &'static str) -> Self {
        Self {
            title,
            description,
            fields: StepFields::Fixed {
                required: Vec::new(),
                optional: Vec::new(),
            },
            rule: None,
        }
    }

    pub fn descriptor(title: &'static str, description: &'static str, include_type: bool) -> Self {
        Self {
            title,
            description,
            fields: StepFields::Descriptor { include_type },
            rule: None,
        }
    }

    pub fn require(mut self, fields: &[Field]) -> Self {
        if let StepFields::Fixed { required, .. } = &mut self.fields {
            required.extend_from_slice(fields);
        }
        self
    }

    pub fn optional(mut self, fields: &[Field]) -> Self {
        if let StepFields::Fixed { optional, .. } = &mut self.fields {
            optional.extend_from_slice(fields);
        }
        self
    }

    pub fn with_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&FormState) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.rule = Some(Arc::new(rule));
        self
    }

    pub fn rule(&self) -> Option<&StepRule> {
        self.rule.as_ref()
    }

    /// Fields listed by a fixed step; empty for descriptor steps.
    pub fn fixed_fields(&self) -> Vec<Field> {
        match &self.fields {
            StepFields::Fixed { required, optional } => {
                required.iter().chain(optional.iter()).copied().collect()
            }
            StepFields::Descriptor { .. } => Vec::new(),
        }
    }
}

impl fmt::Debug for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardStep")
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("has_rule", &self.rule.is_some())
            .finish()
    }
}

/// What a completed flow creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowTarget {
    /// An event; `category` is fixed for tabs and chosen by the user otherwise.
    Event { category: Option<EventCategory> },
    Record(Resource),
}

/// Ordered steps plus flow-wide behaviour.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    pub name: &'static str,
    pub steps: Vec<WizardStep>,
    pub allow_direct_jump: bool,
    pub target: FlowTarget,
    pub defaults: BTreeMap<Field, String>,
    /// Date fields seeded with the context's reference date.
    pub dated: Vec<Field>,
    pub success_path: Option<String>,
    pub cancel_path: Option<String>,
}

impl FlowDefinition {
    pub fn new(name: &'static str, target: FlowTarget) -> Self {
        Self {
            name,
            steps: Vec::new(),
            allow_direct_jump: false,
            target,
            defaults: BTreeMap::new(),
            dated: Vec::new(),
            success_path: None,
            cancel_path: None,
        }
    }

    pub fn step(mut self, step: WizardStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_direct_jump(mut self) -> Self {
        self.allow_direct_jump = true;
        self
    }

    pub fn with_default(mut self, field: Field, value: impl Into<String>) -> Self {
        self.defaults.insert(field, value.into());
        self
    }

    pub fn default_today(mut self, field: Field) -> Self {
        self.dated.push(field);
        self
    }

    pub fn on_success(mut self, path: impl Into<String>) -> Self {
        self.success_path = Some(path.into());
        self
    }

    pub fn on_cancel(mut self, path: impl Into<String>) -> Self {
        self.cancel_path = Some(path.into());
        self
    }

    /// Category fixed by the flow, if any.
    pub fn fixed_category(&self) -> Option<EventCategory> {
        match self.target {
            FlowTarget::Event { category } => category,
            FlowTarget::Record(_) => None,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self.target, FlowTarget::Event { .. })
    }

    /// Fields of all fixed steps in step order.
    pub fn fixed_fields(&self) -> Vec<Field> {
        self.steps.iter().flat_map(WizardStep::fixed_fields).collect()
    }
}
