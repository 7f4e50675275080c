use super::state::{Direction, Grid};

/// Cells closed for further merges during the current sweep.
///
/// A cell enters the guard when it receives a merge, or when it blocks a
/// tile with a different value. Each index is recorded at most once.
#[derive(Debug, Clone, Default)]
pub struct MergeGuard {
    closed: Vec<bool>,
    len: usize,
}

impl MergeGuard {
    pub fn new(cells: usize) -> Self {
        MergeGuard {
            closed: vec![false; cells],
            len: 0,
        }
    }

    #[inline]
    pub fn contains(&self, idx: usize) -> bool {
        self.closed.get(idx).copied().unwrap_or(false)
    }

    /// Close `idx`. Returns false if it was already closed.
    pub fn close(&mut self, idx: usize) -> bool {
        if idx >= self.closed.len() {
            self.closed.resize(idx + 1, false);
        }
        if self.closed[idx] {
            return false;
        }
        self.closed[idx] = true;
        self.len += 1;
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reset(&mut self) {
        if self.len > 0 {
            self.closed.fill(false);
            self.len = 0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Insertion {
    Moved,
    Merged,
    Rejected,
}

/// True for 2, 4, 8, ...
#[inline]
pub fn is_tile_value(v: u32) -> bool {
    v >= 2 && v.is_power_of_two()
}

/// Slide and merge every line of `grid` toward `direction`, in place.
///
/// The guard is reset first. Returns the cells that received a merge, in
/// sweep order.
///
/// Within a line, sources are taken from the edge outward and each one tries
/// destinations from the edge back toward itself. Every tile that has come
/// to rest behind the front-most one is already closed in the guard, so the
/// first accepting slot is the nearest empty cell or an equal, unmerged
/// neighbour; tiles never pass a blocker.
pub fn sweep(grid: &mut Grid, direction: Direction, guard: &mut MergeGuard) -> Vec<usize> {
    guard.reset();
    let size = grid.size;
    let mut merged = Vec::new();

    for line in 0..size {
        for depth in 1..size {
            let source = cell_index(size, direction, line, depth);
            let value = grid.cells[source];
            if value == 0 {
                continue;
            }
            for target in 0..depth {
                let dest = cell_index(size, direction, line, target);
                match insert(&mut grid.cells, guard, value, source, dest) {
                    Insertion::Moved => break,
                    Insertion::Merged => {
                        merged.push(dest);
                        break;
                    }
                    Insertion::Rejected => {}
                }
            }
        }
    }
    merged
}

fn insert(
    cells: &mut [u32],
    guard: &mut MergeGuard,
    value: u32,
    source: usize,
    dest: usize,
) -> Insertion {
    if guard.contains(dest) {
        return Insertion::Rejected;
    }
    let current = cells[dest];
    // A merge past u32::MAX blocks like a different value.
    let merged = match current.checked_add(value) {
        Some(v) if current == 0 || current == value => v,
        _ => {
            guard.close(dest);
            return Insertion::Rejected;
        }
    };
    cells[source] = 0;
    cells[dest] = merged;
    if current == 0 {
        Insertion::Moved
    } else {
        guard.close(dest);
        Insertion::Merged
    }
}

/// Row-major index of the cell `depth` steps in from the `direction` edge on
/// `line` (a row for left/right, a column for up/down).
#[inline]
fn cell_index(size: usize, direction: Direction, line: usize, depth: usize) -> usize {
    let far = size - 1 - depth;
    match direction {
        Direction::Left => line * size + depth,
        Direction::Right => line * size + far,
        Direction::Up => depth * size + line,
        Direction::Down => far * size + line,
    }
}

pub(crate) fn format_val(val: u32) -> String {
    match val {
        0 => " ".repeat(7),
        v => format!("{v:^7}"),
    }
}
