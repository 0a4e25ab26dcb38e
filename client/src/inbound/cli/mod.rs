//! Command-line inbound adapter.
//!
//! Parses arguments with clap, drives the domain services held in
//! [`CliState`], and renders results as plain text. Wiring the concrete
//! outbound adapters is left to the binary.

mod args;
mod commands;
mod render;
mod state;

pub use args::{ApisCommand, Cli, Command, CreateArgs, SettingsCommand};
pub use commands::{CommandError, resolve_user, run};
pub use render::{
    NOT_READY_MESSAGE, render_dashboard, render_endpoint, render_endpoint_list, render_error,
    render_files,
};
pub use state::{CliState, CliStatePorts};
