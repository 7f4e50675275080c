mod config;
mod keys;
mod render;
mod session;
mod strategies;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use config::{Config, StrategyKind};
use session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sliding-tile puzzle (2048) in the terminal")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Grid side length (overrides config)
    #[arg(long, value_name = "N")]
    size: Option<usize>,

    /// RNG seed for reproducible games (overrides config)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Let a strategy play instead of reading keys from stdin
    #[arg(long)]
    autoplay: bool,

    /// Autoplay strategy (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Autoplay move limit (overrides config)
    #[arg(long, value_name = "N")]
    max_moves: Option<u64>,

    /// Emit one JSON frame per move instead of drawing the grid
    #[arg(long)]
    json: bool,

    /// Plain text tiles without ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Log filter, e.g. "info", "debug", "grid_engine=trace"
    #[arg(long, default_value = "warn")]
    log: String,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(strategy) = self.strategy {
            config.autoplay.strategy = strategy;
        }
        if let Some(max_moves) = self.max_moves {
            config.autoplay.max_moves = max_moves;
        }
        if self.no_color {
            config.render.color = false;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log.as_str())).init();

    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let mut session = Session::new(&config, args.json)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = if args.autoplay {
        let mut rng = session::autoplay_rng(config.seed);
        session.run_autoplay(
            config.autoplay.strategy,
            config.autoplay.max_moves,
            &mut rng,
            &mut out,
        )?
    } else {
        session.run_interactive(io::stdin().lock(), &mut out)?
    };

    info!("final grid:{}", session.grid());
    info!(
        "Session finished: {} move(s), highest tile {}, stuck: {}",
        summary.moves, summary.highest_tile, summary.stuck
    );
    if !args.json {
        let ending = if summary.stuck {
            "no legal move left"
        } else {
            "stopped"
        };
        writeln!(
            out,
            "Moves made: {}, highest tile: {} ({ending})",
            summary.moves, summary.highest_tile
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "twenty48",
            "--size",
            "5",
            "--seed",
            "9",
            "--strategy",
            "greedy",
            "--max-moves",
            "12",
            "--no-color",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.size, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.autoplay.strategy, StrategyKind::Greedy);
        assert_eq!(config.autoplay.max_moves, 12);
        assert!(!config.render.color);
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let args = Args::parse_from(["twenty48"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
        assert_eq!(args.log, "warn");
    }
}
