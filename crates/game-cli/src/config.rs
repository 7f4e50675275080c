use std::io::Read;

use anyhow::{Context, Result, ensure};
use grid_engine::engine::check_size;

/// How autoplay picks among the directions that change the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Uniform over legal moves.
    Random,
    /// First legal move in the fixed order down, left, right, up.
    Corner,
    /// Most merges; ties fall back to the corner order.
    Greedy,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default = "defaults::size")]
    pub size: usize,

    // Absent means an entropy-seeded RNG.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "defaults::initial_tiles")]
    pub initial_tiles: usize,

    #[serde(default)]
    pub render: Render,
    #[serde(default)]
    pub autoplay: Autoplay,
    #[serde(default)]
    pub keys: Keys,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Render {
    /// ANSI truecolor tiles; off gives plain text.
    #[serde(default = "defaults::color")]
    pub color: bool,
    /// Minimum characters per cell. Widened automatically for big tiles.
    #[serde(default = "defaults::cell_width")]
    pub cell_width: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Autoplay {
    #[serde(default = "defaults::strategy")]
    pub strategy: StrategyKind,
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u64,
}

/// Extra key bindings, merged over the built-in ones.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Keys {
    #[serde(default)]
    pub up: Vec<String>,
    #[serde(default)]
    pub down: Vec<String>,
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default)]
    pub right: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            seed: None,
            initial_tiles: defaults::initial_tiles(),
            render: Render::default(),
            autoplay: Autoplay::default(),
            keys: Keys::default(),
        }
    }
}

impl Default for Render {
    fn default() -> Self {
        Self {
            color: defaults::color(),
            cell_width: defaults::cell_width(),
        }
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self {
            strategy: defaults::strategy(),
            max_moves: defaults::max_moves(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine or renderer cannot honour.
    pub fn validate(&self) -> Result<()> {
        check_size(self.size)?;
        ensure!(
            self.initial_tiles <= self.size * self.size,
            "initial_tiles ({}) exceeds the {} cells of a {}x{} grid",
            self.initial_tiles,
            self.size * self.size,
            self.size,
            self.size
        );
        ensure!(
            self.render.cell_width >= 1,
            "render.cell_width must be at least 1"
        );
        Ok(())
    }
}

mod defaults {
    use super::StrategyKind;

    pub fn size() -> usize {
        grid_engine::engine::DEFAULT_SIZE
    }
    pub fn initial_tiles() -> usize {
        2
    }
    pub fn color() -> bool {
        true
    }
    pub fn cell_width() -> usize {
        6
    }
    pub fn strategy() -> StrategyKind {
        StrategyKind::Corner
    }
    pub fn max_moves() -> u64 {
        10_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.size, 4);
        assert_eq!(cfg.initial_tiles, 2);
        assert!(cfg.render.color);
        assert_eq!(cfg.autoplay.strategy, StrategyKind::Corner);
    }

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_toml_str(
            r#"
            size = 5
            seed = 7
            initial_tiles = 3

            [render]
            color = false
            cell_width = 8

            [autoplay]
            strategy = "greedy"
            max_moves = 250

            [keys]
            up = ["i"]
            left = ["j", "ArrowLeft"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.size, 5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.initial_tiles, 3);
        assert!(!cfg.render.color);
        assert_eq!(cfg.render.cell_width, 8);
        assert_eq!(cfg.autoplay.strategy, StrategyKind::Greedy);
        assert_eq!(cfg.autoplay.max_moves, 250);
        assert_eq!(cfg.keys.up, vec!["i".to_string()]);
        assert!(cfg.keys.down.is_empty());
    }

    #[test]
    fn rejects_impossible_settings() {
        assert!(Config::from_toml_str("size = 0").is_err());
        assert!(Config::from_toml_str("size = 2\ninitial_tiles = 5").is_err());
        assert!(Config::from_toml_str("[autoplay]\nstrategy = \"sideways\"").is_err());
    }

    #[test]
    fn oversized_grids_are_errors_not_panics() {
        for size in [65, 100_000, usize::MAX / 2, usize::MAX] {
            let cfg = Config {
                size,
                ..Config::default()
            };
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("between 1 and 64"), "{err}");
        }
        assert!(Config::from_toml_str("size = 4294967296").is_err());
        let largest = Config {
            size: 64,
            ..Config::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn missing_file_mentions_path() {
        let err = Config::from_toml("/nonexistent/twenty48.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/twenty48.toml"));
    }
}
