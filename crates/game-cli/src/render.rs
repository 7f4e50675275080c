use anyhow::{Context, Result};
use grid_engine::color::color_for;
use grid_engine::engine::{Direction, Grid};
use serde::Serialize;

use crate::config;

/// Text renderer for the terminal. Empty cells are blank; tiles are
/// centred and, with color on, painted with their lookup colors.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    cell_width: usize,
}

impl Renderer {
    pub fn new(render: &config::Render) -> Self {
        Self {
            color: render.color,
            cell_width: render.cell_width.max(1),
        }
    }

    pub fn render(&self, grid: &Grid) -> String {
        let width = self.cell_width.max(grid.highest_tile().to_string().len() + 2);
        let rule = format!("+{}", format!("{}+", "-".repeat(width)).repeat(grid.size()));
        let mut out = String::new();
        out.push_str(&rule);
        out.push('\n');
        for row in grid.rows() {
            out.push('|');
            for &v in row {
                out.push_str(&self.cell(v, width));
                out.push('|');
            }
            out.push('\n');
            out.push_str(&rule);
            out.push('\n');
        }
        out
    }

    fn cell(&self, value: u32, width: usize) -> String {
        if value == 0 {
            return " ".repeat(width);
        }
        let text = format!("{value:^width$}");
        match color_for(value) {
            Some(c) if self.color => {
                let (br, bg, bb) = c.background_rgb();
                let (fr, fg, fb) = c.foreground_rgb();
                format!("\x1b[48;2;{br};{bg};{bb}m\x1b[38;2;{fr};{fg};{fb}m{text}\x1b[0m")
            }
            _ => text,
        }
    }
}

/// One machine-readable frame: the input that produced it and the grid after.
#[derive(Debug, Serialize)]
pub struct Frame<'a> {
    pub direction: Option<Direction>,
    pub changed: bool,
    pub grid: &'a Grid,
}

pub fn json_frame(direction: Option<Direction>, changed: bool, grid: &Grid) -> Result<String> {
    serde_json::to_string(&Frame { direction, changed, grid }).context("serializing frame")
}
