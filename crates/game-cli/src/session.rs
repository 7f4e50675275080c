use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use grid_engine::engine::{Direction, Grid, GridEngine, MoveOutcome};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{Config, StrategyKind};
use crate::keys::KeyMap;
use crate::render::{Renderer, json_frame};
use crate::strategies;

const QUIT_KEYS: [&str; 3] = ["q", "quit", "exit"];

/// One game: owns the engine and turns input events into moves, one
/// `apply_move` per event, redrawing after each change.
pub struct Session {
    engine: GridEngine,
    renderer: Renderer,
    keymap: KeyMap,
    json: bool,
    moves: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub moves: u64,
    pub highest_tile: u32,
    /// True if the session ended because no direction changes the grid.
    pub stuck: bool,
}

impl Session {
    pub fn new(config: &Config, json: bool) -> Result<Self> {
        let engine = GridEngine::start(config.size, config.seed, config.initial_tiles)
            .context("starting grid engine")?;
        Ok(Self::with_engine(engine, config, json))
    }

    pub fn with_engine(engine: GridEngine, config: &Config, json: bool) -> Self {
        Self {
            engine,
            renderer: Renderer::new(&config.render),
            keymap: KeyMap::from_config(&config.keys),
            json,
            moves: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    /// Read whitespace separated key names from `input` until a quit key,
    /// end of input, or a grid with no legal move.
    pub fn run_interactive<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> Result<SessionSummary> {
        self.draw(out, None, false)?;
        if strategies::is_stuck(self.engine.grid()) {
            return Ok(self.summary(true));
        }
        for line in input.lines() {
            let line = line.context("reading input")?;
            for token in line.split_whitespace() {
                if QUIT_KEYS.contains(&token.to_ascii_lowercase().as_str()) {
                    info!("quit after {} move(s)", self.moves);
                    return Ok(self.summary(false));
                }
                let Some(direction) = self.keymap.lookup(token) else {
                    debug!("ignoring input {token:?}");
                    continue;
                };
                self.step(direction, out)?;
                if strategies::is_stuck(self.engine.grid()) {
                    info!("no legal move left after {} move(s)", self.moves);
                    return Ok(self.summary(true));
                }
            }
        }
        Ok(self.summary(false))
    }

    /// Let a strategy play until it runs out of moves or hits `max_moves`.
    pub fn run_autoplay<W: Write>(
        &mut self,
        kind: StrategyKind,
        max_moves: u64,
        rng: &mut StdRng,
        out: &mut W,
    ) -> Result<SessionSummary> {
        self.draw(out, None, false)?;
        while self.moves < max_moves {
            let Some(direction) = strategies::select_move(self.engine.grid(), kind, rng) else {
                info!("{kind:?} autoplay stuck after {} move(s)", self.moves);
                return Ok(self.summary(true));
            };
            self.step(direction, out)?;
        }
        info!("{kind:?} autoplay stopped at the {max_moves} move limit");
        Ok(self.summary(false))
    }

    fn step<W: Write>(&mut self, direction: Direction, out: &mut W) -> Result<()> {
        let outcome: MoveOutcome = self.engine.apply_move(direction);
        if outcome.is_changed() {
            self.moves += 1;
        }
        if outcome.is_changed() || self.json {
            self.draw(out, Some(direction), outcome.is_changed())?;
        }
        Ok(())
    }

    fn draw<W: Write>(
        &self,
        out: &mut W,
        direction: Option<Direction>,
        changed: bool,
    ) -> Result<()> {
        let grid = self.engine.grid();
        if self.json {
            writeln!(out, "{}", json_frame(direction, changed, grid)?)?;
        } else {
            if let Some(direction) = direction {
                writeln!(out, "move {}: {direction}", self.moves)?;
            }
            write!(out, "{}", self.renderer.render(grid))?;
        }
        out.flush()?;
        Ok(())
    }

    fn summary(&self, stuck: bool) -> SessionSummary {
        SessionSummary {
            moves: self.moves,
            highest_tile: self.engine.grid().highest_tile(),
            stuck,
        }
    }
}

/// RNG for autoplay decisions: derived from the game seed when there is one.
pub fn autoplay_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Render;

    fn plain_config() -> Config {
        Config {
            render: Render {
                color: false,
                cell_width: 4,
            },
            ..Config::default()
        }
    }

    fn session_with(cells: Vec<u32>, json: bool) -> Session {
        let size = (cells.len() as f64).sqrt() as usize;
        let grid = Grid::from_cells(size, cells).unwrap();
        Session::with_engine(GridEngine::from_grid(grid, 5), &plain_config(), json)
    }

    #[test]
    fn interactive_moves_and_ignores_unknown_keys() {
        #[rustfmt::skip]
        let cells = vec![
            2, 2,
            4, 8,
        ];
        let mut session = session_with(cells, false);
        let mut out = Vec::new();
        let summary = session
            .run_interactive("space ArrowLeft\nleft q right\n".as_bytes(), &mut out)
            .unwrap();

        // ArrowLeft merges and the spawn fills the one hole, so the second
        // left is a no-op and `q` stops before `right`.
        let want = SessionSummary {
            moves: 1,
            highest_tile: 8,
            stuck: false,
        };
        assert_eq!(summary, want);
        assert_eq!(session.grid().cells(), &[4, 2, 4, 8]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("move 1: left"));
        assert!(!text.contains("move 2"));
        assert!(!text.contains("right"));
    }

    #[test]
    fn interactive_stops_when_stuck() {
        #[rustfmt::skip]
        let cells = vec![
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 2,
        ];
        let mut session = session_with(cells, false);
        let mut out = Vec::new();
        let summary = session.run_interactive("left".as_bytes(), &mut out).unwrap();
        let want = SessionSummary {
            moves: 0,
            highest_tile: 4,
            stuck: true,
        };
        assert_eq!(summary, want);
    }

    #[test]
    fn json_mode_emits_a_frame_per_direction() {
        #[rustfmt::skip]
        let cells = vec![
            2, 0,
            0, 0,
        ];
        let mut session = session_with(cells, true);
        let mut out = Vec::new();
        session
            .run_interactive("left bogus".as_bytes(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let frames: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["direction"], serde_json::Value::Null);
        assert_eq!(frames[1]["direction"], "left");
        assert_eq!(frames[1]["changed"], false);
        assert_eq!(frames[1]["grid"]["cells"][0], 2);
    }

    #[test]
    fn autoplay_runs_to_a_stop() {
        let config = Config {
            seed: Some(3),
            ..plain_config()
        };
        let kinds = [
            StrategyKind::Random,
            StrategyKind::Corner,
            StrategyKind::Greedy,
        ];
        for kind in kinds {
            let mut session = Session::new(&config, false).unwrap();
            let mut rng = autoplay_rng(config.seed);
            let mut out = Vec::new();
            let summary = session.run_autoplay(kind, 50, &mut rng, &mut out).unwrap();
            assert!(summary.moves <= 50);
            assert!(summary.stuck || summary.moves == 50);
            assert!(summary.highest_tile >= 2);
        }
    }

    #[test]
    fn autoplay_is_reproducible_with_a_seed() {
        let config = Config {
            seed: Some(11),
            ..plain_config()
        };
        let play = || {
            let mut session = Session::new(&config, true).unwrap();
            let mut rng = autoplay_rng(config.seed);
            let mut out = Vec::new();
            session
                .run_autoplay(StrategyKind::Random, 30, &mut rng, &mut out)
                .unwrap();
            (session.grid().clone(), out)
        };
        assert_eq!(play(), play());
    }
}
