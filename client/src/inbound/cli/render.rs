//! Plain-text rendering of command results.

use std::fmt::Write as _;

use crate::domain::{
    DashboardState, EndpointRecord, Error, FileEntry, GridTemplate, ListedEndpoint,
    TileLayoutError, place_tiles,
};

pub const NOT_READY_MESSAGE: &str = "Preparing dashboard...";

/// Render a ready dashboard, tile by tile.
///
/// Placement happens before anything is written, so a malformed tile fails
/// the whole render.
pub fn render_dashboard(state: &DashboardState) -> Result<String, TileLayoutError> {
    let placed = place_tiles(state)?;
    let template = GridTemplate::new(state.grid_size);
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.title.as_deref().unwrap_or("Dashboard"));
    let _ = writeln!(out, "grid-template-columns: {}", template.columns());
    let _ = writeln!(out, "grid-template-rows: {}", template.rows());
    for placed_tile in placed {
        let _ = writeln!(
            out,
            "\n[{}] {}  grid-row: {}; grid-column: {}",
            placed_tile.tile.id,
            placed_tile.tile.title,
            placed_tile.placement.grid_row(),
            placed_tile.placement.grid_column(),
        );
        for line in placed_tile.tile.html.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    Ok(out)
}

pub fn render_endpoint_list(endpoints: &[ListedEndpoint]) -> String {
    if endpoints.is_empty() {
        return "No endpoints defined.\n".to_owned();
    }
    let mut out = String::new();
    for entry in endpoints {
        let _ = writeln!(
            out,
            "{:>3}  {}  {}",
            entry.id, entry.record.path, entry.record.description
        );
    }
    out
}

pub fn render_endpoint(record: &EndpointRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "path:        {}", record.path);
    let _ = writeln!(out, "handler:     {}", record.handler_name);
    let _ = writeln!(out, "description: {}", record.description);
    if let Some(schema) = &record.body_schema {
        let _ = writeln!(out, "body format:");
        for line in schema.render().lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    let _ = writeln!(out, "code:");
    for line in record.source_code.lines() {
        let _ = writeln!(out, "    {line}");
    }
    out
}

pub fn render_files(files: &[FileEntry]) -> String {
    if files.is_empty() {
        return "No files stored.\n".to_owned();
    }
    let mut out = String::new();
    for file in files {
        match &file.description {
            Some(description) => {
                let _ = writeln!(out, "{}  {}", file.name, description);
            }
            None => {
                let _ = writeln!(out, "{}", file.name);
            }
        }
    }
    out
}

/// One-line error report carrying the classified kind.
pub fn render_error(error: &Error) -> String {
    let code = serde_json::to_value(error.code())
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("{:?}", error.code()));
    match error.details() {
        Some(details) => format!("error [{code}]: {} {details}", error.message()),
        None => format!("error [{code}]: {}", error.message()),
    }
}
