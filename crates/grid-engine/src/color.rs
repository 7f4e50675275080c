//! Tile value -> display color lookup for rendering collaborators.
//!
//! The engine never reads this; it exists so that every front end paints
//! tiles the same way.

use serde::Serialize;

/// Background used for tiles above 2048.
pub const BEYOND_2048: &str = "#3c3a32";
/// Text color on light tiles (2 and 4).
pub const DARK_TEXT: &str = "#776e65";
/// Text color on everything else.
pub const LIGHT_TEXT: &str = "#ffffff";

const BACKGROUNDS: [(u32, &str); 11] = [
    (2, "#eee4da"),
    (4, "#ece0c6"),
    (8, "#f2b179"),
    (16, "#ef8c53"),
    (32, "#f57c5f"),
    (64, "#e95937"),
    (128, "#f3d871"),
    (256, "#edcc61"),
    (512, "#eed278"),
    (1024, "#eecf6b"),
    (2048, "#eecd5f"),
];

/// Hex colors (`#rrggbb`) for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayColor {
    pub background: &'static str,
    pub foreground: &'static str,
}

impl DisplayColor {
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(self.background)
    }

    pub fn foreground_rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(self.foreground)
    }
}

/// Colors for a tile value; `None` for an empty cell.
///
/// ```
/// use grid_engine::color::color_for;
/// assert_eq!(color_for(0), None);
/// assert_eq!(color_for(8).unwrap().background, "#f2b179");
/// ```
pub fn color_for(value: u32) -> Option<DisplayColor> {
    if value == 0 {
        return None;
    }
    let background = BACKGROUNDS
        .iter()
        .find(|&&(v, _)| v == value)
        .map(|&(_, hex)| hex)
        .unwrap_or(BEYOND_2048);
    let foreground = if value > 4 { LIGHT_TEXT } else { DARK_TEXT };
    Some(DisplayColor {
        background,
        foreground,
    })
}

fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (channel(0), channel(2), channel(4))
}
