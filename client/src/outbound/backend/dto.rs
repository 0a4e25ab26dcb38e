//! Wire DTOs for the backend's JSON payloads.
//!
//! The adapter decodes into these transport DTOs first, then maps into domain
//! types in one pass. Mapping failures are reported as plain strings and
//! become `RequestError::Decode` in the adapter.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    BodySchema, DashboardState, EndpointDefinition, EndpointPath, FileEntry, GridCell, GridSize,
    NewEndpoint, Tile, TileCoordinates,
};

#[derive(Debug, Serialize)]
pub(super) struct UserRequestDto<'a> {
    pub(super) username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateEndpointRequestDto<'a> {
    username: &'a str,
    endpoint: &'a str,
    function_name: &'a str,
    code: &'a str,
    description: &'a str,
    body_format: Option<&'a BodySchema>,
}

impl<'a> CreateEndpointRequestDto<'a> {
    pub(super) fn new(username: &'a str, endpoint: &'a NewEndpoint) -> Self {
        Self {
            username,
            endpoint: endpoint.path().as_str(),
            function_name: endpoint.handler_name(),
            code: endpoint.source_code(),
            description: endpoint.description(),
            body_format: endpoint.body_schema(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateCodeRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) endpoint: &'a str,
    pub(super) code: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RemoveEndpointRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) endpoint: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreSettingsRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) user_input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct EndpointsResponseDto {
    #[serde(rename = "APIs", default)]
    apis: BTreeMap<String, EndpointDto>,
}

#[derive(Debug, Deserialize)]
struct EndpointDto {
    #[serde(default)]
    description: String,
    #[serde(default)]
    body_format: Value,
    #[serde(default)]
    function_name: String,
    #[serde(default)]
    code: String,
}

impl EndpointsResponseDto {
    pub(super) fn into_domain(self) -> Result<BTreeMap<EndpointPath, EndpointDefinition>, String> {
        self.apis
            .into_iter()
            .map(|(path, endpoint)| {
                let path = EndpointPath::new(&path)
                    .map_err(|error| format!("registry key {path:?} is not a path: {error}"))?;
                Ok((
                    path,
                    EndpointDefinition {
                        description: endpoint.description,
                        handler_name: endpoint.function_name,
                        source_code: endpoint.code,
                        body_schema: BodySchema::from_value(endpoint.body_format),
                    },
                ))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DashboardResponseDto {
    #[serde(default)]
    dashboard: Option<DashboardDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardDto {
    #[serde(default)]
    title: Option<String>,
    grid_size: GridSizeDto,
    #[serde(default)]
    tiles: Vec<TileDto>,
    #[serde(default)]
    readiness_flag: bool,
}

#[derive(Debug, Deserialize)]
struct GridSizeDto {
    rows: NonZeroU32,
    cols: NonZeroU32,
}

#[derive(Debug, Deserialize)]
struct TileDto {
    id: TileIdDto,
    #[serde(default)]
    title: String,
    #[serde(default)]
    html: String,
    coordinates: CoordinatesDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TileIdDto {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinatesDto {
    Cell([u32; 2]),
    Corners([[u32; 2]; 4]),
}

impl DashboardResponseDto {
    pub(super) fn into_domain(self) -> Result<Option<DashboardState>, String> {
        self.dashboard.map(DashboardDto::into_domain).transpose()
    }
}

impl DashboardDto {
    fn into_domain(self) -> Result<DashboardState, String> {
        let mut seen = std::collections::HashSet::with_capacity(self.tiles.len());
        let tiles = self
            .tiles
            .into_iter()
            .map(TileDto::into_domain)
            .map(|tile| {
                if seen.insert(tile.id.clone()) {
                    Ok(tile)
                } else {
                    Err(format!("tile id {} appears more than once", tile.id))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DashboardState {
            title: self.title,
            grid_size: GridSize {
                rows: self.grid_size.rows,
                cols: self.grid_size.cols,
            },
            tiles,
            readiness_flag: self.readiness_flag,
        })
    }
}

impl TileDto {
    fn into_domain(self) -> Tile {
        let id = match self.id {
            TileIdDto::Text(text) => text,
            TileIdDto::Number(number) => number.to_string(),
        };
        let coordinates = match self.coordinates {
            CoordinatesDto::Cell([row, col]) => TileCoordinates::Cell(GridCell::new(row, col)),
            CoordinatesDto::Corners(corners) => {
                TileCoordinates::Corners(corners.map(|[row, col]| GridCell::new(row, col)))
            }
        };
        Tile {
            id,
            title: self.title,
            html: self.html,
            coordinates,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SettingsResponseDto {
    #[serde(default)]
    dash_config: Value,
}

impl SettingsResponseDto {
    /// Text blobs pass through; structured blobs are re-serialised.
    pub(super) fn into_blob(self) -> Option<String> {
        match self.dash_config {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FilesResponseDto {
    #[serde(default)]
    files: BTreeMap<String, Value>,
}

impl FilesResponseDto {
    pub(super) fn into_domain(self) -> Vec<FileEntry> {
        self.files
            .into_iter()
            .map(|(name, meta)| {
                let description = match meta {
                    Value::String(text) => Some(text),
                    Value::Object(mut fields) => match fields.remove("description") {
                        Some(Value::String(text)) => Some(text),
                        _ => None,
                    },
                    _ => None,
                };
                FileEntry { name, description }
            })
            .collect()
    }
}
