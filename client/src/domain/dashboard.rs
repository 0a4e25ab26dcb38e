//! Render-ready dashboard configuration delivered by the backend.

use std::num::NonZeroU32;

/// Grid dimensions of a dashboard; both axes hold at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: NonZeroU32,
    pub cols: NonZeroU32,
}

/// Zero-based cell reference within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

impl GridCell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Where a tile sits on the grid.
///
/// `Corners` lists the span's corners as top-left, bottom-left, bottom-right,
/// top-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCoordinates {
    Cell(GridCell),
    Corners([GridCell; 4]),
}

/// One visual unit of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: String,
    pub title: String,
    /// Pre-rendered markup, inserted as-is by the presentation layer.
    pub html: String,
    pub coordinates: TileCoordinates,
}

/// Dashboard configuration for one user, replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub title: Option<String>,
    pub grid_size: GridSize,
    pub tiles: Vec<Tile>,
    /// Set by the backend once it has finished composing the dashboard.
    pub readiness_flag: bool,
}

impl DashboardState {
    /// Whether the state may be rendered.
    ///
    /// Both signals must agree: the backend flagged the dashboard ready and
    /// it holds at least one tile. A populated but unflagged dashboard is
    /// never partially rendered.
    pub fn is_renderable(&self) -> bool {
        self.readiness_flag && !self.tiles.is_empty()
    }
}
