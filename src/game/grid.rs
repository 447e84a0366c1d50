//! Grid cells, the playfield, and level configuration
//!
//! A level is described by an immutable [`LevelConfig`]; the [`Grid`] keeps
//! that template next to the working copy the puzzle mutates, so a reset is a
//! plain copy rather than a rebuild.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::CELL_SIZE;

/// One grid square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Plain ground; rolling onto it grinds one unit of mass off
    Floor,
    /// Consumable booster: +2 mass on entry, then becomes [`Cell::Floor`]
    Grow,
    /// Blocks entry outright
    Spike,
    /// Target cell; the mass the ball arrives with decides win or loss
    Goal,
}

impl Cell {
    /// Can the ball enter this cell at all?
    pub fn is_enterable(self) -> bool {
        !matches!(self, Cell::Spike)
    }
}

/// Level validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cell array has {got} entries, expected {expected} for a {width}x{height} grid")]
    CellCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
    #[error("start cell ({0}, {1}) is outside the {2}x{3} grid")]
    StartOutOfBounds(i32, i32, usize, usize),
    #[error("unknown cell glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("level rows have uneven widths")]
    RaggedRows,
}

/// Construction-time description of one level. Immutable once built; the
/// catalog constructs a fresh level instance from it on every win or loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    /// Minimum mass required when arriving on the goal cell
    pub goal_size: u32,
    /// Starting cell (column, row)
    pub start: (i32, i32),
    /// Row-major, `width * height` entries
    pub cells: Vec<Cell>,
}

impl LevelConfig {
    /// Parse a level from ASCII rows: `.` floor, `o` grow, `^` spike,
    /// `G` goal.
    pub fn from_rows(
        goal_size: u32,
        start: (i32, i32),
        rows: &[&str],
    ) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut cells = Vec::with_capacity(width * height);
        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(ConfigError::RaggedRows);
            }
            for (col, glyph) in row.chars().enumerate() {
                cells.push(match glyph {
                    '.' => Cell::Floor,
                    'o' => Cell::Grow,
                    '^' => Cell::Spike,
                    'G' => Cell::Goal,
                    _ => {
                        return Err(ConfigError::UnknownGlyph {
                            glyph,
                            row: row_index,
                            col,
                        });
                    }
                });
            }
        }
        let config = Self {
            width,
            height,
            goal_size,
            start,
            cells,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = self.width * self.height;
        if self.cells.len() != expected {
            return Err(ConfigError::CellCountMismatch {
                width: self.width,
                height: self.height,
                expected,
                got: self.cells.len(),
            });
        }
        let (x, y) = self.start;
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(ConfigError::StartOutOfBounds(x, y, self.width, self.height));
        }
        // Assumed but unenforced: every level wants exactly one goal
        let goals = self.cells.iter().filter(|&&c| c == Cell::Goal).count();
        if goals != 1 {
            log::warn!("level has {goals} goal cells, expected exactly 1");
        }
        Ok(())
    }
}

/// World position of a cell center on the XZ plane
pub fn cell_to_world(cell: (i32, i32)) -> Vec3 {
    Vec3::new(cell.0 as f32 * CELL_SIZE, 0.0, cell.1 as f32 * CELL_SIZE)
}

/// Playfield: immutable template plus the working copy a level mutates
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    template: Vec<Cell>,
    cells: Vec<Cell>,
}

impl Grid {
    /// Caller has validated the config; see [`LevelConfig::validate`]
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            template: config.cells.clone(),
            cells: config.cells.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, cell: (i32, i32)) -> usize {
        let clamped = self.clamp_cell(cell);
        debug_assert_eq!(clamped, cell, "cell {cell:?} out of bounds");
        cell.1 as usize * self.width + cell.0 as usize
    }

    /// Nearest in-bounds cell
    pub fn clamp_cell(&self, cell: (i32, i32)) -> (i32, i32) {
        (
            cell.0.clamp(0, self.width as i32 - 1),
            cell.1.clamp(0, self.height as i32 - 1),
        )
    }

    pub fn get(&self, cell: (i32, i32)) -> Cell {
        self.cells[self.index(cell)]
    }

    /// Flip a booster to plain floor, permanently for this level instance
    pub fn consume_grow(&mut self, cell: (i32, i32)) {
        let index = self.index(cell);
        debug_assert_eq!(self.cells[index], Cell::Grow, "consuming a non-grow cell");
        self.cells[index] = Cell::Floor;
    }

    /// Boosters left anywhere on the working grid
    pub fn grow_cells_remaining(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Grow).count()
    }

    /// Copy the template back over the working cells
    pub fn reset(&mut self) {
        self.cells.copy_from_slice(&self.template);
    }

    /// Cell position of the single goal, if the level has one
    pub fn goal_cell(&self) -> Option<(i32, i32)> {
        self.cells.iter().position(|&c| c == Cell::Goal).map(|i| {
            ((i % self.width) as i32, (i / self.width) as i32)
        })
    }

    /// Center of the playfield in level-local space
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.width as f32 - 1.0) * CELL_SIZE / 2.0,
            0.0,
            (self.height as f32 - 1.0) * CELL_SIZE / 2.0,
        )
    }
}
