//! Settling tokens after removal.

use crate::grid::Grid;

/// One gravity pass: in every column, scanning upward from the row above the
/// floor, a token with an empty cell directly below drops one row.
///
/// Returns whether anything moved. A token can fall at most one row per
/// pass, so call until it returns false (or use [`settle`]).
pub fn apply_gravity_step(grid: &mut Grid) -> bool {
    let mut moved = false;
    let floor = grid.height().saturating_sub(1);
    for x in 0..grid.width() {
        for y in (0..floor).rev() {
            if let Some(kind) = grid.get(x, y) {
                if grid.is_vacant(x, y + 1) {
                    grid.set(x, y + 1, Some(kind));
                    grid.set(x, y, None);
                    moved = true;
                }
            }
        }
    }
    moved
}

/// Repeat [`apply_gravity_step`] until nothing moves. Returns how many
/// passes moved at least one token.
pub fn settle(grid: &mut Grid) -> usize {
    let mut passes = 0;
    while apply_gravity_step(grid) {
        passes += 1;
    }
    passes
}

/// Push each column's tokens down into a contiguous run ending at the floor,
/// keeping their vertical order. Returns whether anything moved.
pub fn compact_columns(grid: &mut Grid) -> bool {
    let mut moved = false;
    for x in 0..grid.width() {
        let mut write = grid.height();
        for y in (0..grid.height()).rev() {
            let Some(kind) = grid.get(x, y) else {
                continue;
            };
            write -= 1;
            if write != y {
                grid.set(x, write, Some(kind));
                grid.set(x, y, None);
                moved = true;
            }
        }
    }
    moved
}

/// True if no column has an empty cell beneath an occupied one.
pub fn is_settled(grid: &Grid) -> bool {
    (0..grid.width()).all(|x| {
        let mut seen_empty = false;
        for y in (0..grid.height()).rev() {
            match grid.get(x, y) {
                None => seen_empty = true,
                Some(_) if seen_empty => return false,
                Some(_) => {}
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TokenKind;
    use proptest::prelude::*;

    #[test]
    fn test_single_step_moves_one_row() {
        let mut grid = Grid::from_rows(&["0.", "..", ".."]);
        assert!(apply_gravity_step(&mut grid));
        // The scan runs upward, so the token moved into row 1 is not revisited.
        assert_eq!(grid, Grid::from_rows(&["..", "0.", ".."]));
        assert!(apply_gravity_step(&mut grid));
        assert_eq!(grid, Grid::from_rows(&["..", "..", "0."]));
        assert!(!apply_gravity_step(&mut grid));
    }

    #[test]
    fn test_settle_preserves_column_order() {
        let mut grid = Grid::from_rows(&["1.", "..", "2.", "..", "3."]);
        assert!(settle(&mut grid) > 0);
        assert_eq!(grid, Grid::from_rows(&["..", "..", "1.", "2.", "3."]));
        assert!(is_settled(&grid));
    }

    #[test]
    fn test_settled_grid_does_not_move() {
        let mut grid = Grid::from_rows(&["...", "0..", "01."]);
        assert_eq!(settle(&mut grid), 0);
        assert!(!compact_columns(&mut grid));
    }

    #[test]
    fn test_compact_columns_matches_full_settle() {
        let rows = ["0.1", "...", "2.3", ".4.", "..."];
        let mut settled = Grid::from_rows(&rows);
        let mut compacted = Grid::from_rows(&rows);
        settle(&mut settled);
        assert!(compact_columns(&mut compacted));
        assert_eq!(settled, compacted);
        assert_eq!(compacted.get(0, 4), Some(TokenKind(2)));
        assert_eq!(compacted.get(0, 3), Some(TokenKind(0)));
        assert_eq!(compacted.get(1, 4), Some(TokenKind(4)));
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        proptest::collection::vec(proptest::option::of(0u8..4), 6 * 12).prop_map(|cells| {
            let mut grid = Grid::new(6, 12);
            for (i, c) in cells.into_iter().enumerate() {
                grid.set(i % 6, i / 6, c.map(TokenKind));
            }
            grid
        })
    }

    proptest! {
        #[test]
        fn prop_settle_leaves_contiguous_columns(grid in arb_grid()) {
            let mut settled = grid.clone();
            settle(&mut settled);
            prop_assert!(is_settled(&settled));
            prop_assert_eq!(settled.occupied_count(), grid.occupied_count());

            let mut compacted = grid;
            compact_columns(&mut compacted);
            prop_assert_eq!(settled, compacted);
        }
    }
}
