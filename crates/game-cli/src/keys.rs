use std::collections::HashMap;

use grid_engine::engine::Direction;
use log::warn;

use crate::config;

const DEFAULT_BINDINGS: [(&str, Direction); 16] = [
    ("arrowup", Direction::Up),
    ("up", Direction::Up),
    ("w", Direction::Up),
    ("k", Direction::Up),
    ("arrowdown", Direction::Down),
    ("down", Direction::Down),
    ("s", Direction::Down),
    ("j", Direction::Down),
    ("arrowleft", Direction::Left),
    ("left", Direction::Left),
    ("a", Direction::Left),
    ("h", Direction::Left),
    ("arrowright", Direction::Right),
    ("right", Direction::Right),
    ("d", Direction::Right),
    ("l", Direction::Right),
];

/// Key name -> direction. Lookups ignore case; unbound keys map to nothing.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<String, Direction>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|&(key, dir)| (key.to_string(), dir))
            .collect();
        KeyMap { bindings }
    }
}

impl KeyMap {
    /// Built-in bindings plus the configured extras. An extra that rebinds an
    /// existing key wins.
    pub fn from_config(keys: &config::Keys) -> Self {
        let mut map = KeyMap::default();
        let extras = [
            (&keys.up, Direction::Up),
            (&keys.down, Direction::Down),
            (&keys.left, Direction::Left),
            (&keys.right, Direction::Right),
        ];
        for (names, dir) in extras {
            for name in names {
                map.bind(name, dir);
            }
        }
        map
    }

    pub fn bind(&mut self, key: &str, direction: Direction) {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return;
        }
        if let Some(prev) = self.bindings.insert(key.clone(), direction) {
            if prev != direction {
                warn!("key {key:?} rebound from {prev} to {direction}");
            }
        }
    }

    pub fn lookup(&self, key: &str) -> Option<Direction> {
        self.bindings.get(&key.trim().to_ascii_lowercase()).copied()
    }
}
