//! grid-engine: an N x N sliding-tile (2048-style) grid engine
//!
//! This crate provides:
//! - A `Grid` value type (row-major cells, 0 = empty) with a pure `shift`
//! - A `GridEngine` that owns a grid and an RNG and applies moves + spawns
//! - A value -> color lookup (`color` module) for rendering collaborators
//!
//! Quick start:
//! ```
//! use grid_engine::engine::{Direction, GridEngine, MoveOutcome};
//!
//! // Deterministic opening: empty 4x4 grid plus two spawned tiles
//! let mut engine = GridEngine::start(4, Some(42), 2).unwrap();
//! assert_eq!(engine.grid().count_empty(), 14);
//!
//! let outcome = engine.apply_move(Direction::Left);
//! if let MoveOutcome::Changed { spawned, .. } = outcome {
//!     assert!(spawned.is_some());
//! }
//! ```
//!
//! Note: the engine never decides that a game is over. A caller that wants
//! that can try `Grid::shift` in every direction; a grid with no legal
//! move reports `MoveOutcome::NoOp` for all four.
//!
pub mod color;
pub mod engine;
