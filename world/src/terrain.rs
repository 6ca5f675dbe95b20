//! Passability grid and the mapping between world space and pixel space.

use worms_core::{CellCoord, ConfigurationError, OutOfBoundsError, Position, WorldDimensions};

const PASSABLE_GLYPH: char = '.';
const IMPASSABLE_GLYPH: char = '#';

/// Dense passability grid stored in row-major order.
///
/// Row zero is the bottom row of the world and column zero the leftmost
/// column, matching the bottom-left origin of world space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassableMap {
    columns: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl PassableMap {
    /// Builds a map from rows of passability flags, bottom row first.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self, ConfigurationError> {
        let columns = rows.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(ConfigurationError::EmptyTerrain);
        }

        let mut cells = Vec::with_capacity(columns.saturating_mul(rows.len()));
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(ConfigurationError::RaggedTerrain {
                    row: index,
                    expected: columns,
                    actual: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            columns,
            rows: rows.len(),
            cells,
        })
    }

    /// Builds a map by evaluating the predicate for every pixel.
    pub fn from_fn<F>(
        columns: usize,
        rows: usize,
        mut is_passable: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: FnMut(CellCoord) -> bool,
    {
        if columns == 0 || rows == 0 {
            return Err(ConfigurationError::EmptyTerrain);
        }

        let mut cells = Vec::with_capacity(columns.saturating_mul(rows));
        for row in 0..rows {
            for column in 0..columns {
                cells.push(is_passable(CellCoord::new(column as u32, row as u32)));
            }
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Parses a picture of the terrain drawn top row first.
    ///
    /// `.` marks a passable pixel and `#` an impassable one. Blank lines and
    /// surrounding whitespace are ignored so pictures can be indented.
    pub fn from_ascii(picture: &str) -> Result<Self, ConfigurationError> {
        let mut rows = Vec::new();
        for (line_index, line) in picture.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut row = Vec::with_capacity(trimmed.len());
            for character in trimmed.chars() {
                match character {
                    PASSABLE_GLYPH => row.push(true),
                    IMPASSABLE_GLYPH => row.push(false),
                    other => {
                        return Err(ConfigurationError::InvalidTerrainCharacter {
                            character: other,
                            line: line_index,
                        })
                    }
                }
            }
            rows.push(row);
        }

        rows.reverse();
        Self::new(rows)
    }

    /// Number of pixel columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of pixel rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Passability of the pixel, or `None` when it lies outside the grid.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> Option<bool> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            row.checked_mul(self.columns)?.checked_add(column)
        } else {
            None
        }
    }
}

/// Terrain of a world: its extent in world units plus the passability grid.
#[derive(Clone, Debug)]
pub struct Terrain {
    dimensions: WorldDimensions,
    map: PassableMap,
}

impl Terrain {
    /// Combines world dimensions with a passability grid.
    #[must_use]
    pub fn new(dimensions: WorldDimensions, map: PassableMap) -> Self {
        Self { dimensions, map }
    }

    /// Extent of the world in world units.
    #[must_use]
    pub const fn dimensions(&self) -> WorldDimensions {
        self.dimensions
    }

    /// Underlying passability grid.
    #[must_use]
    pub const fn map(&self) -> &PassableMap {
        &self.map
    }

    pub(crate) fn replace_map(&mut self, map: PassableMap) {
        self.map = map;
    }

    /// Width of a single pixel in world units.
    #[must_use]
    pub fn pixel_width(&self) -> f64 {
        self.dimensions.width() / self.map.columns() as f64
    }

    /// Height of a single pixel in world units.
    #[must_use]
    pub fn pixel_height(&self) -> f64 {
        self.dimensions.height() / self.map.rows() as f64
    }

    /// Maps a world position onto the pixel that contains it.
    pub fn to_grid(&self, position: Position) -> Result<CellCoord, OutOfBoundsError> {
        let (column, row) = self.raw_pixel(position);
        let columns = self.map.columns() as f64;
        let rows = self.map.rows() as f64;
        let inside = column >= 0.0 && column < columns && row >= 0.0 && row < rows;
        if !inside {
            return Err(OutOfBoundsError::position(position));
        }
        Ok(CellCoord::new(column as u32, row as u32))
    }

    /// Reports whether the square padding a circle stays within the pixel extents.
    ///
    /// The padded corners are floored to pixels and the upper bounds are
    /// inclusive, so the square may overhang the top and right edges by less
    /// than one pixel.
    #[must_use]
    pub fn is_located_in_world(&self, center: Position, radius: f64) -> bool {
        if !center.is_finite() || !radius.is_finite() {
            return false;
        }

        let (min_column, min_row) = self.raw_pixel(center.offset(-radius, -radius));
        let (max_column, max_row) = self.raw_pixel(center.offset(radius, radius));
        min_column >= 0.0
            && min_row >= 0.0
            && max_column <= self.map.columns() as f64
            && max_row <= self.map.rows() as f64
    }

    /// Direct lookup of a pixel's passability.
    pub fn is_passable_at(&self, cell: CellCoord) -> Result<bool, OutOfBoundsError> {
        self.map
            .is_passable(cell)
            .ok_or(OutOfBoundsError::Cell(cell))
    }

    /// Reports whether a single sample blocks a body; samples outside the world always do.
    pub(crate) fn is_blocked(&self, sample: Position) -> bool {
        match self.to_grid(sample) {
            Ok(cell) => !self.map.is_passable(cell).unwrap_or(false),
            Err(_) => true,
        }
    }

    fn raw_pixel(&self, position: Position) -> (f64, f64) {
        (
            (position.x() / self.pixel_width()).floor(),
            (position.y() / self.pixel_height()).floor(),
        )
    }
}
