//! `nalflo` entry-point: loads configuration, wires the HTTP backend adapter
//! into the CLI state, and runs one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use client::ClientSettings;
use client::domain::ports::{SettingsCache, TracingPingSink};
use client::inbound::cli::{
    Cli, CliState, CliStatePorts, CommandError, render_error, resolve_user, run,
};
use client::outbound::backend::HttpBackend;
use client::outbound::cache::{FileSettingsCache, InMemorySettingsCache};
use client::outbound::http::RequestClient;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("nalflo")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let state = build_state(&cli, &settings)?;
    let user = resolve_user(cli.user.as_deref(), settings.user());

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    let outcome = runtime.block_on(run(&state, user, cli.command));

    match outcome {
        Ok(output) => {
            io::stdout()
                .write_all(output.as_bytes())
                .wrap_err("failed to write output")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            let message = match &error {
                CommandError::Failed(error) => render_error(error),
                other => format!("error: {other}"),
            };
            writeln!(io::stderr(), "{message}").wrap_err("failed to write error")?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_state(cli: &Cli, settings: &ClientSettings) -> Result<CliState> {
    let base_url = match cli.base_url.as_deref() {
        Some(raw) => Url::parse(raw).wrap_err_with(|| format!("invalid --base-url {raw}"))?,
        None => settings
            .base_url()
            .wrap_err("invalid configured base_url")?,
    };
    let client = RequestClient::with_timeout(base_url, settings.timeout())
        .wrap_err("failed to build HTTP client")?;
    let backend = Arc::new(HttpBackend::new(Arc::new(client)));
    let settings_cache: Arc<dyn SettingsCache> = match settings.cache_dir() {
        Some(dir) => Arc::new(
            FileSettingsCache::open(dir)
                .wrap_err_with(|| format!("failed to open settings cache at {}", dir.display()))?,
        ),
        None => Arc::new(InMemorySettingsCache::new()),
    };

    Ok(CliState::new(CliStatePorts {
        registry: backend.clone(),
        dashboard: backend.clone(),
        liveness: backend.clone(),
        ping_failures: Arc::new(TracingPingSink),
        settings: backend.clone(),
        settings_cache,
        probe: backend,
    }))
}
