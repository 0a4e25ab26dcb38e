//! Runs the layer-boundary lint over the client crate.
//!
//! With no argument the client directory is found next to this tool in the
//! workspace; pass a path to lint another checkout.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let client_dir = env::args_os()
        .nth(1)
        .map_or_else(default_client_dir, PathBuf::from);

    let mut stderr = io::stderr().lock();
    if !client_dir.join("src").is_dir() {
        let _ = writeln!(
            stderr,
            "no client sources under {}; pass the client directory explicitly",
            client_dir.display()
        );
        return ExitCode::FAILURE;
    }

    match architecture_lint::lint_client_sources(&client_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            ExitCode::FAILURE
        }
    }
}

/// `<workspace>/client`, two levels above `tools/architecture-lint`.
fn default_client_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap_or_else(|| Path::new("."))
        .join("client")
}
