use std::{collections::HashMap, fs, path::PathBuf};

use chrono::{Local, NaiveDate};
use strsim::levenshtein;

use crate::capture::{normalize, Resolution};
use crate::catalog::{Catalog, EventCategory, EventTypeDescriptor, Field};
use crate::cli::forms::{default_interaction, WizardOutcome, WizardRunner};
use crate::cli::io::{self, ConsoleNotifier};
use crate::cli::output;
use crate::config::{Config, ConfigManager};
use crate::errors::{CliError, FormError};
use crate::flows;
use crate::form::{FlowDefinition, FormContext, FormController, SubmitOutcome};
use crate::services::{LogNavigator, OutboxClient};
use crate::submission::build_payload;

pub type CommandResult = Result<(), CliError>;
pub type CommandHandler = fn(&mut CliContext, &[String]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    /// Closest command name within a small edit distance.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_ascii_lowercase();
        self.order
            .iter()
            .map(|name| (levenshtein(name, &needle), *name))
            .filter(|(distance, _)| *distance <= 3)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "catalog",
            "List event types",
            "catalog [category]",
            cmd_catalog,
        ),
        CommandDefinition::new(
            "describe",
            "Show the fields of one event type",
            "describe <category> <code>",
            cmd_describe,
        ),
        CommandDefinition::new(
            "add-event",
            "Record an event with the quick-add wizard",
            "add-event [category]",
            cmd_add_event,
        ),
        CommandDefinition::new(
            "start-production",
            "Start a production",
            "start-production",
            cmd_start_production,
        ),
        CommandDefinition::new(
            "finish-production",
            "Close a production with its harvest",
            "finish-production [production-id]",
            cmd_finish_production,
        ),
        CommandDefinition::new(
            "register-establishment",
            "Register an establishment",
            "register-establishment",
            cmd_register_establishment,
        ),
        CommandDefinition::new(
            "capture",
            "Normalize a captured event file and queue it",
            "capture <file> [--dry-run]",
            cmd_capture,
        ),
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
    ]
}

/// State shared by command handlers.
pub struct CliContext {
    pub config: Config,
    pub manager: ConfigManager,
    pub today: NaiveDate,
    pub registry: CommandRegistry,
}

impl CliContext {
    pub fn new() -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        Ok(Self {
            config,
            manager,
            today: Local::now().date_naive(),
            registry: CommandRegistry::new(all_definitions()),
        })
    }

    fn form_context(&self) -> FormContext {
        FormContext::new(self.today)
    }

    fn outbox(&self) -> Result<OutboxClient, CliError> {
        OutboxClient::new(self.manager.outbox_dir(&self.config))
            .map_err(|err| CliError::Input(err.message))
    }

    fn open(&self, flow: FlowDefinition, context: FormContext) -> Result<FormController, CliError> {
        Ok(FormController::new(flow, context, self.config.form_settings())?)
    }

    fn run_wizard(&self, controller: &mut FormController) -> CommandResult {
        let mut interaction = default_interaction();
        let mut client = self.outbox()?;
        let mut notifier = ConsoleNotifier;
        let mut navigator = LogNavigator::default();
        let outcome = WizardRunner::new(controller).run(
            interaction.as_mut(),
            &mut client,
            &mut notifier,
            &mut navigator,
        )?;
        match outcome {
            WizardOutcome::Submitted(record) => {
                io::print_info(format!("Queued as {} in {}", record.id, client.dir().display()));
                Ok(())
            }
            WizardOutcome::Rejected(message) => Err(CliError::Input(message)),
            WizardOutcome::Cancelled => Ok(()),
        }
    }
}

/// Runs one command line, e.g. `["add-event", "weather"]`.
pub fn run_cli(args: Vec<String>) -> CommandResult {
    let mut context = CliContext::new()?;
    let Some((name, rest)) = args.split_first() else {
        print_overview(&context.registry);
        return Ok(());
    };
    let name = name.to_ascii_lowercase();
    let handler = match context.registry.get(&name) {
        Some(definition) => definition.handler,
        None => {
            let hint = context
                .registry
                .suggest(&name)
                .map(|candidate| format!(" (did you mean `{}`?)", candidate))
                .unwrap_or_default();
            return Err(CliError::Input(format!("Unknown command `{}`{}", name, hint)));
        }
    };
    tracing::debug!(command = name.as_str(), "running command");
    handler(&mut context, rest)
}

fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for entry in registry.iter() {
        io::print_info(format!("  {:<24} {}", entry.name, entry.description));
    }
    io::print_info("Use `help <command>` for details.");
}

fn cmd_help(context: &mut CliContext, args: &[String]) -> CommandResult {
    match args.first() {
        Some(name) => match context.registry.get(&name.to_ascii_lowercase()) {
            Some(entry) => {
                output::section(format!("Help: {}", entry.name));
                io::print_info(format!("  Description: {}", entry.description));
                io::print_info(format!("  Usage: {}", entry.usage));
                Ok(())
            }
            None => Err(CliError::Input(format!("Unknown command `{}`", name))),
        },
        None => {
            print_overview(&context.registry);
            Ok(())
        }
    }
}

fn parse_category(raw: &str) -> Result<EventCategory, CliError> {
    Ok(raw.parse::<EventCategory>()?)
}

fn describe_line(descriptor: &EventTypeDescriptor) -> String {
    let fields: Vec<&str> = descriptor
        .fields()
        .filter(|field| *field != Field::Type)
        .map(|field| field.as_str())
        .collect();
    format!("  {:<4} {:<22} {}", descriptor.code, descriptor.name, fields.join(", "))
}

fn cmd_catalog(_context: &mut CliContext, args: &[String]) -> CommandResult {
    let catalog = Catalog::global();
    let categories = match args.first() {
        Some(raw) => vec![parse_category(raw)?],
        None => EventCategory::ALL.to_vec(),
    };
    for category in categories {
        output::section(category.label());
        for descriptor in catalog.descriptors(category) {
            output::line(describe_line(descriptor));
        }
    }
    Ok(())
}

fn cmd_describe(_context: &mut CliContext, args: &[String]) -> CommandResult {
    let [category, code] = args else {
        return Err(CliError::Input("usage: describe <category> <code>".into()));
    };
    let category = parse_category(category)?;
    let descriptor = Catalog::global().lookup(category, code)?;
    output::section(format!("{} ({}/{})", descriptor.name, category, descriptor.code));
    for field in descriptor.fields() {
        let marker = if descriptor.is_required(field) {
            "required"
        } else {
            "optional"
        };
        let default = descriptor
            .default_for(field)
            .map(|value| format!(" [default: {}]", value))
            .unwrap_or_default();
        output::line(format!(
            "  {:<20} {:<9} {}{}",
            field.wire_name(),
            marker,
            field.label(),
            default
        ));
    }
    Ok(())
}

fn cmd_add_event(context: &mut CliContext, args: &[String]) -> CommandResult {
    let category = args.first().map(|raw| parse_category(raw)).transpose()?;
    let mut controller = context.open(
        flows::quick_add_event(category, context.today),
        context.form_context(),
    )?;
    context.run_wizard(&mut controller)
}

fn cmd_start_production(context: &mut CliContext, _args: &[String]) -> CommandResult {
    let mut controller = context.open(flows::quick_start_production(), context.form_context())?;
    let mut source = context.config.option_source();
    controller.load_options(Field::CropType, &mut source);
    context.run_wizard(&mut controller)
}

fn cmd_finish_production(context: &mut CliContext, args: &[String]) -> CommandResult {
    let mut form_context = context.form_context();
    if let Some(raw) = args.first() {
        let id = raw
            .parse::<u64>()
            .map_err(|_| CliError::Input(format!("`{}` is not a production id", raw)))?;
        form_context = form_context.with_production(id);
    }
    let mut controller = context.open(flows::finish_production(context.today), form_context)?;
    context.run_wizard(&mut controller)
}

fn cmd_register_establishment(context: &mut CliContext, _args: &[String]) -> CommandResult {
    let mut controller = context.open(flows::register_establishment(), context.form_context())?;
    context.run_wizard(&mut controller)
}

fn cmd_capture(context: &mut CliContext, args: &[String]) -> CommandResult {
    let dry_run = args.iter().any(|arg| arg == "--dry-run");
    let Some(path) = args.iter().find(|arg| !arg.starts_with("--")) else {
        return Err(CliError::Input("usage: capture <file> [--dry-run]".into()));
    };
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(PathBuf::from(path))?)?;
    let capture = normalize(&raw, Catalog::global());
    match capture.resolution {
        Resolution::Exact => {}
        Resolution::Inferred => io::print_warning(format!(
            "Event type inferred as {}/{}",
            capture.category, capture.code
        )),
        Resolution::Fallback => io::print_warning(format!(
            "Could not resolve the event type; using {}/{}",
            capture.category, capture.code
        )),
    }

    let mut controller = context.open(
        flows::quick_add_event(None, context.today),
        context.form_context(),
    )?;
    controller.seed_from_capture(&capture)?;
    let last = controller.step_count().saturating_sub(1);
    if let Err(err) = controller.go_to_step(last) {
        if let FormError::Validation(errors) = &err {
            for error in errors {
                io::print_error(error);
            }
        }
        return Err(err.into());
    }

    if dry_run {
        let payload = build_payload(
            controller.state(),
            controller.flow(),
            controller.context(),
            &controller.settings().policy,
            controller.catalog(),
        )?;
        output::line(serde_json::to_string_pretty(&payload.to_wire())?);
        return Ok(());
    }

    let mut client = context.outbox()?;
    match controller.submit(&mut client, &mut ConsoleNotifier, &mut LogNavigator::default())? {
        SubmitOutcome::Submitted(record) => {
            io::print_info(format!("Queued as {}", record.id));
            Ok(())
        }
        SubmitOutcome::Rejected(err) => Err(CliError::Input(err.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_suggests_close_names() {
        let registry = CommandRegistry::new(all_definitions());
        assert_eq!(registry.suggest("add-evnt"), Some("add-event"));
        assert_eq!(registry.suggest("catalgo"), Some("catalog"));
        assert_eq!(registry.suggest("something-else-entirely"), None);
    }

    #[test]
    fn describe_line_lists_fields_without_type() {
        let descriptor = Catalog::global()
            .lookup(EventCategory::Weather, "FR")
            .unwrap();
        let line = describe_line(descriptor);
        assert!(line.contains("lower_temperature, way_of_protection, observation"));
        assert!(!line.contains("type"));
    }
}
