use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use super::ops::{self, MergeGuard};
use anyhow::{Result, ensure};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Grid side length used when nothing else is configured.
pub const DEFAULT_SIZE: usize = 4;

/// Largest accepted grid side length.
pub const MAX_SIZE: usize = 64;

/// Value given to every newly spawned tile.
pub const SPAWN_VALUE: u32 = 2;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse a direction or arrow-key name ("up", "ArrowUp", ...), ignoring case.
    ///
    /// Anything else yields `None`; callers treat that as a no-op input.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" => Some(Direction::Up),
            "down" | "arrowdown" => Some(Direction::Down),
            "left" | "arrowleft" => Some(Direction::Left),
            "right" | "arrowright" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of `GridEngine::apply_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The sweep left the grid untouched; nothing was spawned.
    NoOp,
    /// The grid changed. `spawned` is the cell that received the new tile.
    Changed {
        merges: usize,
        spawned: Option<usize>,
    },
}

impl MoveOutcome {
    #[inline]
    pub fn is_changed(self) -> bool {
        matches!(self, MoveOutcome::Changed { .. })
    }
}

/// Row-major N x N grid of tile values. 0 is an empty cell, anything else
/// is a power of two >= 2.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    pub(crate) size: usize,
    pub(crate) cells: Vec<u32>,
}

#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<u32>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = anyhow::Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        Grid::from_cells(raw.size, raw.cells)
    }
}

/// A grid produced by a pure shift, with the cells that received a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shifted {
    pub grid: Grid,
    pub merged: Vec<usize>,
}

impl Grid {
    /// An empty `size` x `size` grid.
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Grid {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Build a grid from row-major cells, validating count and tile values.
    ///
    /// ```
    /// use grid_engine::engine::Grid;
    /// let g = Grid::from_cells(2, vec![2, 0, 0, 4]).unwrap();
    /// assert_eq!(g.get(1, 1), 4);
    /// assert!(Grid::from_cells(2, vec![3, 0, 0, 0]).is_err());
    /// ```
    pub fn from_cells(size: usize, cells: Vec<u32>) -> Result<Self> {
        check_size(size)?;
        ensure!(
            cells.len() == size * size,
            "expected {} cells for a {size}x{size} grid, got {}",
            size * size,
            cells.len()
        );
        if let Some((idx, v)) = cells
            .iter()
            .enumerate()
            .find(|&(_, &v)| v != 0 && !ops::is_tile_value(v))
        {
            anyhow::bail!("cell {idx} holds {v}, which is not 0 or a power of two >= 2");
        }
        Ok(Grid { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Borrow the row-major cells.
    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Value at `(row, col)`; panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        assert!(row < self.size && col < self.size, "cell out of bounds");
        self.cells[row * self.size + col]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size)
    }

    pub fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Sum of all tile values.
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    /// Highest tile value present, 0 on an empty grid.
    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Return the grid resulting from sliding/merging tiles in `direction`
    /// (no spawn), along with the cells that received a merge.
    ///
    /// ```
    /// use grid_engine::engine::{Direction, Grid};
    /// let g = Grid::from_cells(2, vec![2, 2, 0, 4]).unwrap();
    /// let s = g.shift(Direction::Left);
    /// assert_eq!(s.grid.cells(), &[4, 0, 4, 0]);
    /// assert_eq!(s.merged, vec![0]);
    /// ```
    pub fn shift(&self, direction: Direction) -> Shifted {
        let mut grid = self.clone();
        let mut guard = MergeGuard::new(grid.cells.len());
        let merged = ops::sweep(&mut grid, direction, &mut guard);
        Shifted { grid, merged }
    }

    /// True if shifting in `direction` would change the grid.
    pub fn can_shift(&self, direction: Direction) -> bool {
        self.shift(direction).grid != *self
    }
}

/// Sizes outside `1..=MAX_SIZE` are rejected before any `size * size`.
pub fn check_size(size: usize) -> Result<()> {
    ensure!(
        (1..=MAX_SIZE).contains(&size),
        "grid size must be between 1 and {MAX_SIZE}, got {size}"
    );
    Ok(())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}x{} {:?})", self.size, self.size, self.cells)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.size * 8);
        writeln!(f)?;
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f, "{rule}")?;
            }
            let row: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}

/// Owns the grid state and is its only mutator: one `apply_move` per input
/// event, one spawn per changing move.
///
/// Construct it once and pass it around explicitly; there is no global
/// instance.
pub struct GridEngine {
    grid: Grid,
    guard: MergeGuard,
    rng: StdRng,
}

impl GridEngine {
    /// Empty grid with an entropy-seeded RNG.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_rng(Grid::new(size)?, StdRng::from_entropy()))
    }

    /// Empty grid with a deterministic RNG.
    pub fn with_seed(size: usize, seed: u64) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(size)?, seed))
    }

    /// Adopt an existing grid; spawns draw from an RNG seeded with `seed`.
    pub fn from_grid(grid: Grid, seed: u64) -> Self {
        Self::with_rng(grid, StdRng::seed_from_u64(seed))
    }

    /// Opening position: an empty grid followed by `initial_tiles` spawns.
    ///
    /// ```
    /// use grid_engine::engine::GridEngine;
    /// let engine = GridEngine::start(4, Some(7), 2).unwrap();
    /// assert_eq!(engine.grid().sum(), 4);
    /// ```
    pub fn start(size: usize, seed: Option<u64>, initial_tiles: usize) -> Result<Self> {
        let mut engine = match seed {
            Some(seed) => Self::with_seed(size, seed)?,
            None => Self::new(size)?,
        };
        for _ in 0..initial_tiles {
            engine.spawn_tile();
        }
        debug!(
            "started {size}x{size} grid with {} tile(s)",
            size * size - engine.grid.count_empty()
        );
        Ok(engine)
    }

    fn with_rng(grid: Grid, rng: StdRng) -> Self {
        let guard = MergeGuard::new(grid.cells.len());
        GridEngine { grid, guard, rng }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn cells(&self) -> &[u32] {
        self.grid.cells()
    }

    /// Put a 2 into a uniformly chosen empty cell. Returns the cell index,
    /// or `None` when the grid is full.
    pub fn spawn_tile(&mut self) -> Option<usize> {
        let empty = self.grid.empty_indices();
        if empty.is_empty() {
            trace!("spawn skipped: grid is full");
            return None;
        }
        let idx = empty[self.rng.gen_range(0..empty.len())];
        self.grid.cells[idx] = SPAWN_VALUE;
        trace!("spawned {SPAWN_VALUE} at cell {idx}");
        Some(idx)
    }

    /// Sweep the grid toward `direction`. If anything moved, spawn one tile
    /// and report `Changed`; otherwise the grid is untouched and the result
    /// is `NoOp`.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let snapshot = self.grid.clone();
        let merged = ops::sweep(&mut self.grid, direction, &mut self.guard);
        self.guard.reset();

        if self.grid == snapshot {
            debug!("move {direction}: no-op");
            return MoveOutcome::NoOp;
        }

        let spawned = self.spawn_tile();
        debug!(
            "move {direction}: {} merge(s), spawned at {:?}",
            merged.len(),
            spawned
        );
        MoveOutcome::Changed {
            merges: merged.len(),
            spawned,
        }
    }

    /// Apply a raw key/direction name. Unrecognized input is ignored.
    pub fn apply_input(&mut self, key: &str) -> MoveOutcome {
        match Direction::from_key(key) {
            Some(direction) => self.apply_move(direction),
            None => {
                trace!("ignoring input {key:?}");
                MoveOutcome::NoOp
            }
        }
    }
}
