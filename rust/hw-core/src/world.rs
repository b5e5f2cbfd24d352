//! Hexagonal grid world.
//!
//! Cells are stored row-major in a single vector. The grid uses the odd-row
//! offset layout: odd rows are shifted half a cell to the right, so a cell has
//! up to six neighbours.

use crate::action::{Action, Coord};
use crate::config::WorldConfig;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("cell {coord} is outside the {width}x{height} grid")]
    UnknownCell { coord: Coord, width: u32, height: u32 },
    #[error("expected {expected} cells, got {got}")]
    CellCount { expected: usize, got: usize },
    #[error("cell at index {index} has coordinate {got}, expected {expected}")]
    MisplacedCell {
        index: usize,
        expected: Coord,
        got: Coord,
    },
    #[error("invalid cell {coord}: {msg}")]
    InvalidCell { coord: Coord, msg: &'static str },
}

/// One hex of terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub coord: Coord,
    pub elevation: f64,
    pub water_level: f64,
    /// Sticky: set once `water_level` reaches the flood level, never cleared.
    pub is_flooded: bool,
    pub population: f64,
    pub has_drain: bool,
    pub drain_failed: bool,
    pub evacuated: bool,
}

impl Cell {
    /// Dry, empty, flat cell.
    pub fn new(coord: Coord) -> Self {
        Self {
            coord,
            elevation: 0.0,
            water_level: 0.0,
            is_flooded: false,
            population: 0.0,
            has_drain: false,
            drain_failed: false,
            evacuated: false,
        }
    }

    /// True when the cell has a drain that has not clogged.
    pub fn drain_working(&self) -> bool {
        self.has_drain && !self.drain_failed
    }

    /// Height of the water surface.
    pub fn surface(&self) -> f64 {
        self.elevation + self.water_level
    }
}

/// Snapshot of the whole grid. `Clone` is a deep, independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl World {
    /// Flat, dry, unpopulated grid.
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a world from explicit cells, given in row-major order.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self, WorldError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(WorldError::CellCount {
                expected,
                got: cells.len(),
            });
        }
        for (index, c) in cells.iter().enumerate() {
            let want = Coord::new(index as u32 % width, index as u32 / width);
            if c.coord != want {
                return Err(WorldError::MisplacedCell {
                    index,
                    expected: want,
                    got: c.coord,
                });
            }
            validate_cell(c)?;
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Random terrain: elevation, population and drain placement come from `rng`.
    pub fn generate<R: Rng + ?Sized>(cfg: &WorldConfig, rng: &mut R) -> Self {
        let mut world = Self::new(cfg.width, cfg.height);
        for c in &mut world.cells {
            c.elevation = rng.gen::<f64>() * cfg.max_elevation;
            c.population = (rng.gen::<f64>() * cfg.max_population).round();
            c.has_drain = rng.gen_bool(cfg.drain_density);
        }
        world
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if self.contains(c) {
            Some(c.y as usize * self.width as usize + c.x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, c: Coord) -> Option<&Cell> {
        self.index(c).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, c: Coord) -> Option<&mut Cell> {
        let i = self.index(c)?;
        Some(&mut self.cells[i])
    }

    /// Lookup that reports out-of-range coordinates as an error.
    pub fn try_cell(&self, c: Coord) -> Result<&Cell, WorldError> {
        self.cell(c).ok_or(WorldError::UnknownCell {
            coord: c,
            width: self.width,
            height: self.height,
        })
    }

    /// In-bounds hex neighbours of `c` (at most six).
    pub fn neighbors(&self, c: Coord) -> Vec<Coord> {
        // (dx, dy) offsets for even and odd rows.
        const EVEN: [(i64, i64); 6] = [(-1, 0), (1, 0), (-1, -1), (0, -1), (-1, 1), (0, 1)];
        const ODD: [(i64, i64); 6] = [(-1, 0), (1, 0), (0, -1), (1, -1), (0, 1), (1, 1)];

        let offsets = if c.y % 2 == 0 { &EVEN } else { &ODD };
        let mut out = Vec::with_capacity(6);
        for &(dx, dy) in offsets {
            let nx = c.x as i64 + dx;
            let ny = c.y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }
            out.push(Coord::new(nx as u32, ny as u32));
        }
        out
    }

    /// Mark every cell named by `action` as evacuated.
    ///
    /// Fails without modifying the world if any coordinate is outside the grid.
    pub fn apply_evacuation(&mut self, action: &Action) -> Result<(), WorldError> {
        for &c in action.iter() {
            self.try_cell(c)?;
        }
        for &c in action.iter() {
            if let Some(cell) = self.cell_mut(c) {
                cell.evacuated = true;
            }
        }
        Ok(())
    }

    /// Latch the flooded flag on every cell at or above `flood_level`.
    pub fn refresh_flooded(&mut self, flood_level: f64) {
        for c in &mut self.cells {
            if c.water_level >= flood_level {
                c.is_flooded = true;
            }
        }
    }

    pub fn flooded_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_flooded).count()
    }

    pub fn evacuated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.evacuated).count()
    }

    pub fn total_water(&self) -> f64 {
        self.cells.iter().fold(0.0, |acc, c| acc + c.water_level)
    }

    /// Population living in flooded cells that were never evacuated.
    pub fn population_at_risk(&self) -> f64 {
        self.cells
            .iter()
            .filter(|c| c.is_flooded && !c.evacuated)
            .fold(0.0, |acc, c| acc + c.population)
    }
}

fn validate_cell(c: &Cell) -> Result<(), WorldError> {
    if !(c.water_level.is_finite() && c.water_level >= 0.0) {
        return Err(WorldError::InvalidCell {
            coord: c.coord,
            msg: "water_level must be finite and >= 0",
        });
    }
    if !(c.population.is_finite() && c.population >= 0.0) {
        return Err(WorldError::InvalidCell {
            coord: c.coord,
            msg: "population must be finite and >= 0",
        });
    }
    if !c.elevation.is_finite() {
        return Err(WorldError::InvalidCell {
            coord: c.coord,
            msg: "elevation must be finite",
        });
    }
    Ok(())
}
