//! Grid coordinates and evacuation actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer cell coordinates. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cells to evacuate in one time step.
///
/// Conceptually a set. Actions drawn with replacement may repeat a coordinate;
/// every consumer treats membership, not multiplicity, as meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    cells: Vec<Coord>,
}

impl Action {
    /// Evacuate nobody.
    pub fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn new(cells: Vec<Coord>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.cells.contains(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coord> {
        self.cells.iter()
    }
}

impl From<Vec<Coord>> for Action {
    fn from(cells: Vec<Coord>) -> Self {
        Self::new(cells)
    }
}

impl FromIterator<Coord> for Action {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
