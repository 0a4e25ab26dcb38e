//! Command-line arguments for the `nalflo` binary.

use clap::{Args, Parser, Subcommand};

/// `nalflo` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nalflo",
    about = "Inspect dashboards and manage custom backend endpoints",
    version
)]
pub struct Cli {
    /// User identity; falls back to the configured `user`.
    #[arg(long, global = true, value_name = "email")]
    pub user: Option<String>,
    /// Backend base address; falls back to the configured `base_url`.
    #[arg(long = "base-url", global = true, value_name = "url")]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load and print the dashboard.
    Dashboard,
    /// Ask the backend to recompose the dashboard, then print it.
    Refresh,
    /// Manage custom endpoints.
    Apis {
        #[command(subcommand)]
        command: ApisCommand,
    },
    /// Read or replace the settings blob.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// List the user's stored files.
    Files,
    /// Check that the backend is reachable.
    Health,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ApisCommand {
    /// List endpoints ordered by path.
    List,
    /// Show one endpoint.
    Show {
        #[arg(value_name = "path")]
        path: String,
    },
    /// Register a new endpoint.
    Create(CreateArgs),
    /// Replace an endpoint's source code.
    UpdateCode {
        #[arg(value_name = "path")]
        path: String,
        #[arg(long, value_name = "source")]
        code: String,
    },
    /// Delete an endpoint. Irreversible.
    Remove {
        #[arg(value_name = "path")]
        path: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Route, starting with `/`.
    #[arg(long, value_name = "path")]
    pub path: String,
    #[arg(long = "handler", value_name = "name")]
    pub handler_name: String,
    #[arg(long, value_name = "source")]
    pub code: String,
    #[arg(long, value_name = "text")]
    pub description: String,
    /// Expected request body; parsed as JSON when possible.
    #[arg(long = "body-format", value_name = "schema")]
    pub body_format: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    Get,
    Set {
        #[arg(value_name = "text")]
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn remove_defaults_to_unconfirmed() {
        let cli = Cli::try_parse_from(["nalflo", "apis", "remove", "/users"]).expect("parse");
        let Command::Apis {
            command: ApisCommand::Remove { path, yes },
        } = cli.command
        else {
            panic!("expected apis remove");
        };
        assert_eq!(path, "/users");
        assert!(!yes);
    }

    #[rstest]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["nalflo", "files", "--user", "ada@nalflo.com"])
            .expect("parse");
        assert_eq!(cli.user.as_deref(), Some("ada@nalflo.com"));
        assert!(matches!(cli.command, Command::Files));
    }

    #[rstest]
    fn create_requires_every_mandatory_field() {
        let result = Cli::try_parse_from(["nalflo", "apis", "create", "--path", "/users"]);
        assert!(result.is_err());
    }
}
