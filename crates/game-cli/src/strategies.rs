use grid_engine::engine::{Direction, Grid};
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::StrategyKind;

/// Fallback order for deterministic strategies: keep tiles in the bottom-left.
pub(crate) const CORNER_ORDER: [Direction; 4] =
    [Direction::Down, Direction::Left, Direction::Right, Direction::Up];

/// Which of `Direction::ALL` would change the grid.
pub(crate) fn legal_mask(grid: &Grid) -> [bool; 4] {
    let mut mask = [false; 4];
    for (i, &d) in Direction::ALL.iter().enumerate() {
        mask[i] = grid.can_shift(d);
    }
    mask
}

/// True when no direction changes the grid.
pub(crate) fn is_stuck(grid: &Grid) -> bool {
    !legal_mask(grid).contains(&true)
}

fn select_move_random(grid: &Grid, rng: &mut StdRng) -> Option<Direction> {
    let legal: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| grid.can_shift(d))
        .collect();
    if legal.is_empty() {
        return None;
    }
    Some(legal[rng.gen_range(0..legal.len())])
}

fn select_move_corner(grid: &Grid) -> Option<Direction> {
    CORNER_ORDER.into_iter().find(|&d| grid.can_shift(d))
}

fn select_move_greedy(grid: &Grid) -> Option<Direction> {
    let mut best: Option<(Direction, usize)> = None;
    for d in CORNER_ORDER {
        let shifted = grid.shift(d);
        if shifted.grid == *grid {
            continue;
        }
        let merges = shifted.merged.len();
        if best.is_none_or(|(_, m)| merges > m) {
            best = Some((d, merges));
        }
    }
    best.map(|(d, _)| d)
}

/// Pick the next autoplay move, or `None` when nothing changes the grid.
pub(crate) fn select_move(
    grid: &Grid,
    kind: StrategyKind,
    rng: &mut StdRng,
) -> Option<Direction> {
    match kind {
        StrategyKind::Random => select_move_random(grid, rng),
        StrategyKind::Corner => select_move_corner(grid),
        StrategyKind::Greedy => select_move_greedy(grid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[rustfmt::skip]
    const LOCKED: [u32; 16] = [
        2, 4, 2, 4,
        4, 2, 4, 2,
        2, 4, 2, 4,
        4, 2, 4, 2,
    ];

    #[test]
    fn locked_grid_has_no_move() {
        let grid = Grid::from_cells(4, LOCKED.to_vec()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(is_stuck(&grid));
        assert_eq!(legal_mask(&grid), [false; 4]);
        let kinds = [
            StrategyKind::Random,
            StrategyKind::Corner,
            StrategyKind::Greedy,
        ];
        for kind in kinds {
            assert_eq!(select_move(&grid, kind, &mut rng), None);
        }
    }

    #[test]
    fn corner_prefers_down_then_left() {
        // Only the top row is occupied, so down is legal.
        let mut cells = vec![0; 16];
        cells[0] = 2;
        let grid = Grid::from_cells(4, cells).unwrap();
        assert_eq!(select_move_corner(&grid), Some(Direction::Down));

        // Bottom-left tile: down and left are no-ops, right is next.
        let mut cells = vec![0; 16];
        cells[12] = 2;
        let grid = Grid::from_cells(4, cells).unwrap();
        assert_eq!(legal_mask(&grid), [true, false, false, true]);
        assert_eq!(select_move_corner(&grid), Some(Direction::Right));
    }

    #[test]
    fn greedy_takes_the_move_with_most_merges() {
        #[rustfmt::skip]
        let grid = Grid::from_cells(4, vec![
            2, 2, 4, 4,
            0, 0, 0, 0,
            0, 0, 0, 0,
            8, 0, 0, 0,
        ]).unwrap();
        // Horizontal moves merge twice; down merges nothing.
        assert_eq!(select_move_greedy(&grid), Some(Direction::Left));
    }

    #[test]
    fn random_only_returns_legal_moves() {
        let mut cells = vec![0; 16];
        cells[12] = 2;
        let grid = Grid::from_cells(4, cells).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            let d = select_move_random(&grid, &mut rng).unwrap();
            assert!(matches!(d, Direction::Up | Direction::Right));
        }
    }
}
