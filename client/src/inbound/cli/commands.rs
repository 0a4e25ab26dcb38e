//! Command dispatch for the CLI adapter.

use std::fmt::Write as _;

use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::info;

use super::args::{ApisCommand, Command, CreateArgs, SettingsCommand};
use super::render::{
    NOT_READY_MESSAGE, render_dashboard, render_endpoint, render_endpoint_list, render_files,
};
use super::state::CliState;
use crate::domain::ports::RequestError;
use crate::domain::{
    BodySchema, EndpointDraft, EndpointPath, EndpointValidationError, Error, LoaderStatus,
    RegistryError, SettingsError, SettingsSource, TileLayoutError, TriggerOutcome,
    UpdateCodeError, UserValidationError, Username,
};

/// Why a command produced no result.
#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error("no user given; pass --user or set NALFLO_USER")]
    MissingUser,
    #[error("invalid user: {0}")]
    InvalidUser(#[from] UserValidationError),
    #[error("refusing to remove {path} without --yes")]
    ConfirmationRequired { path: String },
    #[error("backend is unreachable")]
    Unreachable,
    #[error("{0}")]
    Failed(Error),
}

macro_rules! failed_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CommandError {
                fn from(value: $source) -> Self {
                    Self::Failed(Error::from(value))
                }
            }
        )*
    };
}

failed_from!(
    RequestError,
    EndpointValidationError,
    RegistryError,
    UpdateCodeError,
    SettingsError,
    TileLayoutError,
);

/// Resolve the effective user from the flag or configured default.
pub fn resolve_user(
    flag: Option<&str>,
    configured: Option<&str>,
) -> Result<Username, CommandError> {
    let raw = flag.or(configured).ok_or(CommandError::MissingUser)?;
    Ok(Username::new(raw)?)
}

/// Run one command and return its printable output.
pub async fn run(
    state: &CliState,
    user: Result<Username, CommandError>,
    command: Command,
) -> Result<String, CommandError> {
    match command {
        Command::Health => health(state).await,
        Command::Dashboard => dashboard(state, user?).await,
        Command::Refresh => refresh(state, user?).await,
        Command::Apis { command } => apis(state, &user?, command).await,
        Command::Settings { command } => settings(state, &user?, command).await,
        Command::Files => {
            let files = state.registry.list_files(&user?).await?;
            Ok(render_files(&files))
        }
    }
}

async fn health(state: &CliState) -> Result<String, CommandError> {
    if state.probe.is_reachable().await {
        Ok("backend is reachable\n".to_owned())
    } else {
        Err(CommandError::Unreachable)
    }
}

async fn dashboard(state: &CliState, user: Username) -> Result<String, CommandError> {
    let outcome = state.loader.mount(user).await;
    render_outcome(outcome)
}

async fn refresh(state: &CliState, user: Username) -> Result<String, CommandError> {
    state.loader.mount(user).await;
    let outcome = state.loader.force_refresh().await;
    render_outcome(outcome)
}

fn render_outcome(outcome: TriggerOutcome) -> Result<String, CommandError> {
    match outcome {
        TriggerOutcome::Settled(LoaderStatus::Ready(dashboard)) => {
            Ok(render_dashboard(&dashboard)?)
        }
        TriggerOutcome::Settled(LoaderStatus::Failed(error)) => Err(error.into()),
        TriggerOutcome::Settled(_) | TriggerOutcome::Coalesced | TriggerOutcome::Superseded => {
            Ok(format!("{NOT_READY_MESSAGE}\n"))
        }
        TriggerOutcome::NoUser => Err(CommandError::MissingUser),
    }
}

async fn apis(
    state: &CliState,
    user: &Username,
    command: ApisCommand,
) -> Result<String, CommandError> {
    match command {
        ApisCommand::List => {
            let endpoints = state.registry.list(user).await?;
            Ok(render_endpoint_list(&endpoints))
        }
        ApisCommand::Show { path } => {
            let path = EndpointPath::new(path)?;
            let record = state.registry.get(user, &path).await?;
            Ok(render_endpoint(&record))
        }
        ApisCommand::Create(args) => {
            let path = state.registry.create(user, draft_from(args)).await?;
            info!(user = %user, path = %path, "endpoint created from cli");
            Ok(format!("created {path}\n"))
        }
        ApisCommand::UpdateCode { path, code } => {
            let path = EndpointPath::new(path)?;
            state.registry.update_code(user, &path, &code).await?;
            Ok(format!("updated {path}\n"))
        }
        ApisCommand::Remove { path, yes } => {
            if !yes {
                return Err(CommandError::ConfirmationRequired { path });
            }
            let path = EndpointPath::new(path)?;
            state.registry.remove(user, &path).await?;
            Ok(format!("removed {path}\n"))
        }
    }
}

fn draft_from(args: CreateArgs) -> EndpointDraft {
    let body_schema = args.body_format.and_then(|raw| {
        let value = serde_json::from_str::<Value>(&raw)
            .ok()
            .filter(Value::is_object)
            .unwrap_or(Value::String(raw));
        BodySchema::from_value(value)
    });
    EndpointDraft {
        path: args.path,
        handler_name: args.handler_name,
        source_code: args.code,
        description: args.description,
        body_schema,
    }
}

async fn settings(
    state: &CliState,
    user: &Username,
    command: SettingsCommand,
) -> Result<String, CommandError> {
    match command {
        SettingsCommand::Get => {
            let snapshot = state.settings.load(user).await?;
            let mut out = snapshot.blob.unwrap_or_default();
            if !out.ends_with('\n') {
                out.push('\n');
            }
            if let SettingsSource::LocalCache { remote_error } = snapshot.source {
                let _ = writeln!(out, "(served from local cache: {remote_error})");
            }
            Ok(out)
        }
        SettingsCommand::Set { value } => {
            state.settings.save(user, &value).await?;
            Ok("settings saved\n".to_owned())
        }
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
