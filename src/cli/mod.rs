pub mod commands;
pub mod forms;
pub mod io;
pub mod output;
pub mod shell;
mod test_mode;

pub use commands::run_cli;
