#![doc(test(attr(deny(warnings))))]

//! Agrotrace Core drives the multi-step data-entry wizards used to record
//! farm traceability events, productions and establishments: a catalog of
//! event types and their field sets, a step controller with validation, and
//! an adapter that turns form state into typed submission payloads.

pub mod capture;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod flows;
pub mod form;
pub mod services;
pub mod submission;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Agrotrace Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
