//! Engine module: the N x N grid, the directional sweep, and the engine
//! that ties moves to tile spawns. Public API stays small and ergonomic.
//!
//! - `Grid` is the row-major cell state with useful read-only methods.
//! - `GridEngine` owns a `Grid` plus its RNG and is the only mutator.
//! - The sweep itself and its `MergeGuard` live in `ops`.

mod ops;
pub mod state;

pub use state::{
    DEFAULT_SIZE, Direction, Grid, GridEngine, MAX_SIZE, MoveOutcome, SPAWN_VALUE, Shifted,
    check_size,
};

pub use ops::{MergeGuard, is_tile_value, sweep};
