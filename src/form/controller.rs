//! Step-by-step form controller: owns one wizard's state, validates steps,
//! swaps the visible field set when the event type changes and submits the
//! result through the collaborator traits.

use std::collections::{BTreeMap, BTreeSet};

use crate::capture::NormalizedCapture;
use crate::catalog::{Catalog, EventCategory, EventTypeDescriptor, Field};
use crate::errors::{CatalogError, FormError, SubmissionError, ValidationError};
use crate::form::steps::{FlowDefinition, FlowTarget, StepFields, WizardStep};
use crate::form::validation::{check_required, CheckContext, ValidationPolicy, DATE_FORMAT};
use crate::form::{FormContext, FormState};
use crate::services::{
    MutationClient, Navigator, Notification, NotificationStatus, Notifier, OptionQuery,
    OptionSource, QueryState, Record,
};
use crate::submission::{build_payload, Resource, SubmissionPayload};

pub const DEFAULT_NOTIFICATION_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    pub policy: ValidationPolicy,
    pub notification_duration_ms: u64,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            notification_duration_ms: DEFAULT_NOTIFICATION_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStatus {
    Open,
    /// A mutation is in flight; all edits are rejected.
    Submitting,
    Closed,
}

/// One rendered field of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleField {
    pub field: Field,
    pub required: bool,
}

/// Outcome of switching the event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorChange {
    pub requested: String,
    pub applied: &'static str,
    /// The requested code was unknown and the category baseline was used.
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(Record),
    Rejected(SubmissionError),
}

pub struct FormController {
    flow: FlowDefinition,
    catalog: &'static Catalog,
    context: FormContext,
    settings: FormSettings,
    initial: FormState,
    state: FormState,
    errors: BTreeMap<Field, ValidationError>,
    options: BTreeMap<Field, Vec<String>>,
    status: WizardStatus,
}

impl FormController {
    pub fn new(
        flow: FlowDefinition,
        context: FormContext,
        settings: FormSettings,
    ) -> Result<Self, FormError> {
        Self::with_initial(flow, context, settings, BTreeMap::new())
    }

    /// Opens the flow in edit mode, pre-filled with `initial` values.
    pub fn with_initial(
        flow: FlowDefinition,
        context: FormContext,
        settings: FormSettings,
        initial: BTreeMap<Field, String>,
    ) -> Result<Self, FormError> {
        let mut values = flow.defaults.clone();
        let today = context.today.format(DATE_FORMAT).to_string();
        for field in &flow.dated {
            values.entry(*field).or_insert_with(|| today.clone());
        }
        let mut controller = Self {
            flow,
            catalog: Catalog::global(),
            context,
            settings,
            initial: FormState::default(),
            state: FormState {
                values,
                ..FormState::default()
            },
            errors: BTreeMap::new(),
            options: BTreeMap::new(),
            status: WizardStatus::Open,
        };

        if let Some(category) = controller.flow.fixed_category() {
            controller.set_category(category)?;
        }
        let mut initial = initial;
        if let Some(raw) = initial.remove(&Field::EventCategory) {
            controller.set_field(Field::EventCategory, raw)?;
        }
        if let Some(code) = initial.remove(&Field::Type) {
            controller.set_discriminator(&code)?;
        }
        for (field, value) in initial {
            controller.state.values.insert(field, value);
        }

        controller.initial = controller.state.clone();
        tracing::debug!(flow = controller.flow.name, "form opened");
        Ok(controller)
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn context(&self) -> &FormContext {
        &self.context
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == WizardStatus::Submitting
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn step_count(&self) -> usize {
        self.flow.steps.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step + 1 >= self.step_count()
    }

    pub fn step(&self, index: usize) -> Result<&WizardStep, FormError> {
        self.flow.steps.get(index).ok_or(FormError::StepOutOfRange {
            index,
            total: self.step_count(),
        })
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.state.value(field)
    }

    pub fn errors(&self) -> &BTreeMap<Field, ValidationError> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn options(&self, field: Field) -> Option<&[String]> {
        self.options.get(&field).map(Vec::as_slice)
    }

    /// Descriptor of the active event type, if the flow has one selected.
    pub fn active_descriptor(&self) -> Option<&'static EventTypeDescriptor> {
        let category = self.state.category?;
        let code = self.state.discriminator.as_deref()?;
        self.catalog.lookup(category, code).ok()
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), FormError> {
        self.ensure_open()?;
        let value = value.into();
        match field {
            Field::Type => self.set_discriminator(&value).map(|_| ()),
            Field::EventCategory => {
                let category = EventCategory::parse(&value)
                    .ok_or_else(|| CatalogError::UnknownCategory(value.trim().to_string()))?;
                self.set_category(category)
            }
            _ => {
                self.state.values.insert(field, value);
                self.errors.remove(&field);
                Ok(())
            }
        }
    }

    pub fn set_category(&mut self, category: EventCategory) -> Result<(), FormError> {
        self.ensure_open()?;
        match self.flow.target {
            FlowTarget::Record(_) => return Err(FormError::CategoryLocked),
            FlowTarget::Event {
                category: Some(fixed),
            } if fixed != category => return Err(FormError::CategoryLocked),
            FlowTarget::Event { .. } => {}
        }
        if self.state.category == Some(category) {
            return Ok(());
        }
        let previous = self.active_descriptor();
        self.state.category = Some(category);
        self.state
            .values
            .insert(Field::EventCategory, category.as_str().to_string());
        self.errors.remove(&Field::EventCategory);
        self.apply_descriptor(category.baseline_code(), previous)
            .map(|_| ())
    }

    pub fn set_discriminator(&mut self, code: &str) -> Result<DiscriminatorChange, FormError> {
        self.ensure_open()?;
        let previous = self.active_descriptor();
        self.apply_descriptor(code, previous)
    }

    fn apply_descriptor(
        &mut self,
        code: &str,
        previous: Option<&'static EventTypeDescriptor>,
    ) -> Result<DiscriminatorChange, FormError> {
        let category = self.state.category.ok_or(FormError::CategoryNotSelected)?;
        let (descriptor, fell_back) = self.catalog.lookup_or_baseline(category, code)?;

        for (field, default) in &descriptor.defaults {
            let stale = match self.state.values.get(field).map(|value| value.trim()) {
                None => true,
                Some("") => true,
                Some(current) => previous.and_then(|p| p.default_for(*field)) == Some(current),
            };
            if stale {
                self.state.values.insert(*field, default.clone());
            }
        }
        self.state
            .values
            .insert(Field::Type, descriptor.code.to_string());
        self.state.discriminator = Some(descriptor.code.to_string());

        let visible = self.all_visible();
        self.errors.retain(|field, _| visible.contains(field));

        tracing::debug!(
            category = %category,
            requested = code.trim(),
            applied = descriptor.code,
            fell_back,
            "event type changed"
        );
        Ok(DiscriminatorChange {
            requested: code.trim().to_string(),
            applied: descriptor.code,
            fell_back,
        })
    }

    /// Fields rendered for step `index` given the active event type.
    pub fn visible_fields(&self, index: usize) -> Result<Vec<VisibleField>, FormError> {
        let step = self.step(index)?;
        let fields = match &step.fields {
            StepFields::Fixed { required, optional } => required
                .iter()
                .map(|field| VisibleField {
                    field: *field,
                    required: true,
                })
                .chain(optional.iter().map(|field| VisibleField {
                    field: *field,
                    required: false,
                }))
                .collect(),
            StepFields::Descriptor { include_type } => match self.active_descriptor() {
                Some(descriptor) => descriptor
                    .required
                    .iter()
                    .filter(|field| *include_type || **field != Field::Type)
                    .map(|field| VisibleField {
                        field: *field,
                        required: true,
                    })
                    .chain(descriptor.optional.iter().map(|field| VisibleField {
                        field: *field,
                        required: false,
                    }))
                    .collect(),
                None if *include_type => vec![VisibleField {
                    field: Field::Type,
                    required: true,
                }],
                None => Vec::new(),
            },
        };
        Ok(fields)
    }

    fn all_visible(&self) -> BTreeSet<Field> {
        (0..self.step_count())
            .filter_map(|index| self.visible_fields(index).ok())
            .flatten()
            .map(|visible| visible.field)
            .collect()
    }

    /// Checks step `index` without recording anything.
    pub fn check_step(&self, index: usize) -> Result<(), FormError> {
        let step = self.step(index)?;
        let mut errors = Vec::new();
        for visible in self.visible_fields(index)? {
            if !visible.required {
                continue;
            }
            let ctx = CheckContext {
                policy: &self.settings.policy,
                catalog: self.catalog,
                category: self.state.category,
                options: self.options(visible.field),
            };
            if let Err(err) = check_required(visible.field, self.value(visible.field), &ctx) {
                errors.push(err);
            }
        }
        if errors.is_empty() {
            if let Some(rule) = step.rule() {
                if let Err(err) = rule(&self.state) {
                    errors.push(err);
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Validation(errors))
        }
    }

    /// Checks step `index` and records its field errors.
    pub fn validate_step(&mut self, index: usize) -> Result<(), FormError> {
        let result = self.check_step(index);
        let step_fields: Vec<Field> = self
            .visible_fields(index)?
            .into_iter()
            .map(|visible| visible.field)
            .collect();
        self.errors.retain(|field, _| !step_fields.contains(field));
        if let Err(FormError::Validation(errors)) = &result {
            for err in errors {
                self.errors.insert(err.field, err.clone());
            }
        }
        result
    }

    pub fn go_next(&mut self) -> Result<usize, FormError> {
        self.ensure_open()?;
        if self.is_last_step() {
            return Err(FormError::NoNextStep);
        }
        self.validate_step(self.state.current_step)?;
        self.state.current_step += 1;
        tracing::debug!(step = self.state.current_step, "advanced");
        Ok(self.state.current_step)
    }

    pub fn go_previous(&mut self) -> Result<usize, FormError> {
        self.ensure_open()?;
        self.state.current_step = self.state.current_step.saturating_sub(1);
        Ok(self.state.current_step)
    }

    pub fn go_to_step(&mut self, target: usize) -> Result<usize, FormError> {
        self.ensure_open()?;
        self.step(target)?;
        let current = self.state.current_step;
        if target > current && !self.flow.allow_direct_jump {
            for index in current..target {
                self.validate_step(index)?;
            }
        }
        self.state.current_step = target;
        tracing::debug!(step = target, "jumped");
        Ok(target)
    }

    pub fn set_options(&mut self, field: Field, options: Vec<String>) {
        self.options.insert(field, options);
    }

    /// Queries `source` for the options of `field`. Only ready results are
    /// kept; while loading or after a failure the field is not checked
    /// against a list.
    pub fn load_options(
        &mut self,
        field: Field,
        source: &mut dyn OptionSource,
    ) -> QueryState<Vec<String>> {
        let query = OptionQuery {
            field,
            context: self.context.clone(),
        };
        let result = source.fetch(&query);
        match &result {
            QueryState::Ready(options) => {
                self.options.insert(field, options.clone());
            }
            QueryState::Failed(reason) => {
                tracing::warn!(field = %field, reason = reason.as_str(), "option query failed");
            }
            QueryState::Loading => {}
        }
        result
    }

    /// Validates every step and builds the payload. The controller stays in
    /// `Submitting` until [`finish_submission`](Self::finish_submission).
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, FormError> {
        self.ensure_open()?;
        if !self.is_last_step() {
            return Err(FormError::NotTerminalStep {
                index: self.state.current_step,
            });
        }
        let mut errors = Vec::new();
        for index in 0..self.step_count() {
            match self.validate_step(index) {
                Ok(()) => {}
                Err(FormError::Validation(found)) => errors.extend(found),
                Err(other) => return Err(other),
            }
        }
        if !errors.is_empty() {
            return Err(FormError::Validation(errors));
        }
        let payload = build_payload(
            &self.state,
            &self.flow,
            &self.context,
            &self.settings.policy,
            self.catalog,
        )?;
        if !payload.dropped.is_empty() {
            tracing::debug!(dropped = ?payload.dropped, "unreadable values sent as null");
        }
        self.status = WizardStatus::Submitting;
        Ok(payload)
    }

    pub fn finish_submission(
        &mut self,
        result: Result<Record, SubmissionError>,
        notifier: &mut dyn Notifier,
        navigator: &mut dyn Navigator,
    ) -> Result<SubmitOutcome, FormError> {
        if self.status != WizardStatus::Submitting {
            return Err(FormError::NoSubmissionInFlight);
        }
        match result {
            Ok(record) => {
                tracing::info!(flow = self.flow.name, id = %record.id, "submission accepted");
                notifier.notify(Notification::new(
                    NotificationStatus::Success,
                    self.success_title(),
                    format!("Saved to {}", record.resource),
                    self.settings.notification_duration_ms,
                ));
                self.state = self.initial.clone();
                self.errors.clear();
                self.status = WizardStatus::Closed;
                if let Some(path) = &self.flow.success_path {
                    navigator.go_to(path);
                }
                Ok(SubmitOutcome::Submitted(record))
            }
            Err(err) => {
                tracing::warn!(flow = self.flow.name, kind = ?err.kind, %err, "submission failed");
                notifier.notify(Notification::new(
                    NotificationStatus::Error,
                    "Error",
                    err.message.clone(),
                    self.settings.notification_duration_ms,
                ));
                self.status = WizardStatus::Open;
                Ok(SubmitOutcome::Rejected(err))
            }
        }
    }

    pub fn submit(
        &mut self,
        client: &mut dyn MutationClient,
        notifier: &mut dyn Notifier,
        navigator: &mut dyn Navigator,
    ) -> Result<SubmitOutcome, FormError> {
        let payload = self.begin_submission()?;
        let result = client.create(&payload);
        self.finish_submission(result, notifier, navigator)
    }

    pub fn cancel(&mut self, navigator: &mut dyn Navigator) -> Result<(), FormError> {
        if self.status == WizardStatus::Submitting {
            return Err(FormError::SubmissionInFlight);
        }
        self.state = self.initial.clone();
        self.errors.clear();
        self.status = WizardStatus::Closed;
        if let Some(path) = &self.flow.cancel_path {
            navigator.go_to(path);
        }
        Ok(())
    }

    /// Starts over at the first step with the initial values.
    pub fn reopen(&mut self) -> Result<(), FormError> {
        if self.status == WizardStatus::Submitting {
            return Err(FormError::SubmissionInFlight);
        }
        self.state = self.initial.clone();
        self.errors.clear();
        self.status = WizardStatus::Open;
        Ok(())
    }

    /// Applies a normalized capture: category, event type, then values.
    pub fn seed_from_capture(
        &mut self,
        capture: &NormalizedCapture,
    ) -> Result<DiscriminatorChange, FormError> {
        self.set_category(capture.category)?;
        let change = self.set_discriminator(&capture.code)?;
        for (field, value) in &capture.values {
            if matches!(field, Field::Type | Field::EventCategory) {
                continue;
            }
            self.state.values.insert(*field, value.clone());
            self.errors.remove(field);
        }
        Ok(change)
    }

    fn success_title(&self) -> &'static str {
        match self.flow.target {
            FlowTarget::Event { .. } => "Event created",
            FlowTarget::Record(Resource::Production) => "Production started",
            FlowTarget::Record(Resource::ProductionFinish) => "Production finished",
            FlowTarget::Record(Resource::Establishment) => "Establishment registered",
            FlowTarget::Record(Resource::Event(_)) => "Event created",
        }
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        match self.status {
            WizardStatus::Open => Ok(()),
            WizardStatus::Submitting => Err(FormError::SubmissionInFlight),
            WizardStatus::Closed => Err(FormError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::flows;

    fn context() -> FormContext {
        FormContext::new(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()).with_parcel(11)
    }

    fn tab(category: EventCategory) -> FormController {
        FormController::new(flows::event_tab(category), context(), FormSettings::default())
            .unwrap()
    }

    fn visible(controller: &FormController) -> Vec<Field> {
        controller
            .visible_fields(0)
            .unwrap()
            .into_iter()
            .map(|v| v.field)
            .collect()
    }

    #[test]
    fn tab_opens_on_baseline_with_defaults() {
        let controller = tab(EventCategory::Weather);
        assert_eq!(controller.state().discriminator.as_deref(), Some("FR"));
        assert_eq!(controller.value(Field::Type), Some("FR"));
        assert_eq!(controller.status(), WizardStatus::Open);
        assert!(visible(&controller).contains(&Field::LowerTemperature));
    }

    #[test]
    fn defaults_refresh_only_when_untouched() {
        let mut controller = tab(EventCategory::Production);
        controller.set_discriminator("IR").unwrap();
        assert_eq!(controller.value(Field::IrrigationMethod), Some("drip"));

        controller.set_discriminator("HA").unwrap();
        assert_eq!(controller.value(Field::YieldUnit), Some("kg"));
        controller.set_field(Field::YieldUnit, "t").unwrap();
        controller.set_discriminator("IR").unwrap();
        controller.set_discriminator("HA").unwrap();
        assert_eq!(controller.value(Field::YieldUnit), Some("t"));
    }

    #[test]
    fn unknown_code_falls_back_to_baseline() {
        let mut controller = tab(EventCategory::SoilManagement);
        let change = controller.set_discriminator("XX").unwrap();
        assert!(change.fell_back);
        assert_eq!(change.applied, "ST");
        assert_eq!(controller.value(Field::Type), Some("ST"));
    }

    #[test]
    fn category_is_locked_on_tabs() {
        let mut controller = tab(EventCategory::Weather);
        assert_eq!(
            controller.set_category(EventCategory::Business),
            Err(FormError::CategoryLocked)
        );
        assert!(controller.set_category(EventCategory::Weather).is_ok());
    }

    #[test]
    fn errors_of_hidden_fields_are_cleared() {
        let mut controller = tab(EventCategory::Equipment);
        controller.set_discriminator("FC").unwrap();
        assert!(controller.validate_step(0).is_err());
        assert!(controller.error(Field::FuelAmount).is_some());
        controller.set_discriminator("MN").unwrap();
        assert!(controller.error(Field::FuelAmount).is_none());
    }

    #[test]
    fn closed_form_rejects_edits() {
        let mut controller = tab(EventCategory::General);
        let mut navigator = crate::services::LogNavigator::default();
        controller.cancel(&mut navigator).unwrap();
        assert_eq!(
            controller.set_field(Field::EventName, "x"),
            Err(FormError::Closed)
        );
        controller.reopen().unwrap();
        assert!(controller.set_field(Field::EventName, "x").is_ok());
    }

    #[test]
    fn edit_mode_seeds_initial_values() {
        let initial = [
            (Field::Type, "PE".to_string()),
            (Field::ProductName, "Bugaway".to_string()),
        ]
        .into_iter()
        .collect();
        let controller = FormController::with_initial(
            flows::event_tab(EventCategory::Chemical),
            context(),
            FormSettings::default(),
            initial,
        )
        .unwrap();
        assert_eq!(controller.value(Field::Type), Some("PE"));
        assert_eq!(controller.value(Field::ProductName), Some("Bugaway"));
        assert_eq!(controller.value(Field::WayOfApplication), Some("foliar"));
    }
}
