use std::fmt;

use crate::cli::output;
use crate::services::{Notification, Notifier};

/// Print an informational message via the standard CLI output helpers.
pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

/// Notifier that prints toasts to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: Notification) {
        let kind = output::MessageKind::from(notification.status);
        if notification.description.is_empty() {
            output::print(kind, &notification.title);
        } else {
            output::print(
                kind,
                format!("{}: {}", notification.title, notification.description),
            );
        }
    }
}
