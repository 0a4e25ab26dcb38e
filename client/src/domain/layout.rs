//! Tile layout engine.
//!
//! Converts zero-based tile coordinates into 1-based, exclusive-end grid
//! lines. The mapping is pure and deterministic. Inverted spans and
//! coordinates whose grid lines do not fit in `u32` are rejected rather than
//! clamped; bounds against the grid size are the backend's contract and are
//! not checked here.

use thiserror::Error;

use super::dashboard::{DashboardState, GridSize, Tile, TileCoordinates};

const MIN_CELL_PX: u32 = 160;
const MAX_CELL_PX: u32 = 300;

/// Rectangular placement in 1-based grid lines with exclusive ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub row_start: u32,
    pub row_end: u32,
    pub column_start: u32,
    pub column_end: u32,
}

impl TilePlacement {
    /// Number of rows covered.
    pub const fn rows(&self) -> u32 {
        self.row_end - self.row_start
    }

    /// Number of columns covered.
    pub const fn columns(&self) -> u32 {
        self.column_end - self.column_start
    }

    /// Total number of cells covered.
    pub const fn cells(&self) -> u64 {
        self.rows() as u64 * self.columns() as u64
    }

    /// `grid-row` value, e.g. `"1 / 3"`.
    pub fn grid_row(&self) -> String {
        format!("{} / {}", self.row_start, self.row_end)
    }

    /// `grid-column` value, e.g. `"2 / 3"`.
    pub fn grid_column(&self) -> String {
        format!("{} / {}", self.column_start, self.column_end)
    }
}

/// Malformed tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The end corner lies above or left of the start corner.
    #[error(
        "tile span is inverted: rows {start_row}..={end_row}, columns {start_col}..={end_col}"
    )]
    InvertedSpan {
        start_row: u32,
        end_row: u32,
        start_col: u32,
        end_col: u32,
    },
    /// A coordinate is too large to express as an exclusive-end grid line.
    #[error("tile coordinate {coordinate} has no grid line after it")]
    OutOfRange { coordinate: u32 },
}

/// Compute the placement for one set of coordinates.
///
/// The four-corner form takes its start from the first corner and its end
/// from the third (bottom-right) corner.
///
/// # Examples
/// ```
/// use client::domain::{GridCell, TileCoordinates, place};
///
/// let single = place(&TileCoordinates::Cell(GridCell::new(1, 2))).expect("placement");
/// assert_eq!((single.grid_row(), single.grid_column()), ("2 / 3".to_owned(), "3 / 4".to_owned()));
///
/// let span = place(&TileCoordinates::Corners([
///     GridCell::new(0, 0),
///     GridCell::new(1, 0),
///     GridCell::new(1, 2),
///     GridCell::new(0, 2),
/// ]))
/// .expect("placement");
/// assert_eq!(span.cells(), 6);
/// ```
pub fn place(coordinates: &TileCoordinates) -> Result<TilePlacement, LayoutError> {
    let (start, end) = match coordinates {
        TileCoordinates::Cell(cell) => (*cell, *cell),
        TileCoordinates::Corners([start, _, end, _]) => (*start, *end),
    };

    if start.row > end.row || start.col > end.col {
        return Err(LayoutError::InvertedSpan {
            start_row: start.row,
            end_row: end.row,
            start_col: start.col,
            end_col: end.col,
        });
    }

    Ok(TilePlacement {
        row_start: grid_line(start.row, 1)?,
        row_end: grid_line(end.row, 2)?,
        column_start: grid_line(start.col, 1)?,
        column_end: grid_line(end.col, 2)?,
    })
}

fn grid_line(coordinate: u32, offset: u32) -> Result<u32, LayoutError> {
    coordinate
        .checked_add(offset)
        .ok_or(LayoutError::OutOfRange { coordinate })
}

/// A tile together with its computed placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedTile<'a> {
    pub tile: &'a Tile,
    pub placement: TilePlacement,
}

/// Layout failure attributed to a specific tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tile {tile_id} cannot be placed: {source}")]
pub struct TileLayoutError {
    pub tile_id: String,
    #[source]
    pub source: LayoutError,
}

/// Place every tile of a dashboard, failing on the first malformed tile.
pub fn place_tiles(state: &DashboardState) -> Result<Vec<PlacedTile<'_>>, TileLayoutError> {
    state
        .tiles
        .iter()
        .map(|tile| {
            place(&tile.coordinates)
                .map(|placement| PlacedTile { tile, placement })
                .map_err(|source| TileLayoutError {
                    tile_id: tile.id.clone(),
                    source,
                })
        })
        .collect()
}

/// Track sizing for the whole dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTemplate {
    grid: GridSize,
}

impl GridTemplate {
    /// Template for a grid of `grid` cells.
    pub const fn new(grid: GridSize) -> Self {
        Self { grid }
    }

    /// `grid-template-columns` value with flexible cell widths.
    pub fn columns(&self) -> String {
        format!(
            "repeat({}, minmax({MIN_CELL_PX}px, {MAX_CELL_PX}px))",
            self.grid.cols
        )
    }

    /// `grid-template-rows` value; rows grow with their content.
    pub fn rows(&self) -> String {
        format!("repeat({}, minmax({MIN_CELL_PX}px, auto))", self.grid.rows)
    }
}
