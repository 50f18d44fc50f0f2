//! Match detection: 4-connected groups of one token kind at or above the
//! vanish threshold.

use crate::config::POINTS_PER_TOKEN;
use crate::grid::{Grid, TokenKind};

const NEIGHBOURS_4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// One connected group that reached the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: TokenKind,
    /// Member cells as `(x, y)`, sorted row-major.
    pub cells: Vec<(usize, usize)>,
}

impl MatchGroup {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Everything one detection pass found. All groups vanish together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPass {
    /// Groups sorted by their first cell, so the result does not depend on
    /// which cell a search started from.
    pub groups: Vec<MatchGroup>,
    pub score_delta: u64,
}

impl ChainPass {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Union of every group's cells.
    pub fn cells(&self) -> Vec<(usize, usize)> {
        let mut cells: Vec<_> = self.groups.iter().flat_map(|g| g.cells.iter().copied()).collect();
        cells.sort_unstable_by_key(|&(x, y)| (y, x));
        cells
    }

    pub fn token_count(&self) -> usize {
        self.groups.iter().map(MatchGroup::len).sum()
    }
}

/// Scan the grid row-major and collect every qualifying group.
pub fn find_matches(grid: &Grid, threshold: usize) -> ChainPass {
    let order = (0..grid.height()).flat_map(|y| (0..grid.width()).map(move |x| (x, y)));
    find_matches_with_order(grid, threshold, order)
}

/// Like [`find_matches`], but starting searches in the given cell order.
/// Cells outside the grid are skipped. Only group membership matters, so
/// any order covering the grid yields the same pass.
pub fn find_matches_with_order(
    grid: &Grid,
    threshold: usize,
    order: impl IntoIterator<Item = (usize, usize)>,
) -> ChainPass {
    let (w, h) = (grid.width(), grid.height());
    let mut visited = vec![false; w * h];
    let mut groups = Vec::new();

    for (x, y) in order {
        if x >= w || y >= h || visited[y * w + x] {
            continue;
        }
        let Some(kind) = grid.get(x, y) else {
            continue;
        };
        let mut cells = flood_fill(grid, &mut visited, x, y, kind);
        if cells.len() >= threshold {
            cells.sort_unstable_by_key(|&(cx, cy)| (cy, cx));
            groups.push(MatchGroup { kind, cells });
        }
    }

    groups.sort_unstable_by_key(|g| {
        let (x, y) = g.cells[0];
        (y, x)
    });
    let score_delta = groups
        .iter()
        .map(|g| g.len() as u64 * POINTS_PER_TOKEN)
        .sum();
    ChainPass {
        groups,
        score_delta,
    }
}

/// Iterative depth-first fill from `(x, y)` over cells of `kind`, marking
/// `visited` as it goes.
fn flood_fill(
    grid: &Grid,
    visited: &mut [bool],
    x: usize,
    y: usize,
    kind: TokenKind,
) -> Vec<(usize, usize)> {
    let w = grid.width();
    let mut component = Vec::new();
    let mut stack = vec![(x, y)];
    visited[y * w + x] = true;

    while let Some((cx, cy)) = stack.pop() {
        component.push((cx, cy));
        for (dx, dy) in NEIGHBOURS_4 {
            let (nx, ny) = (cx as i32 + dx, cy as i32 + dy);
            if !grid.contains(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !visited[ny * w + nx] && grid.get(nx, ny) == Some(kind) {
                visited[ny * w + nx] = true;
                stack.push((nx, ny));
            }
        }
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pad(rows: &[&str]) -> Grid {
        let mut all = vec!["......"; 12 - rows.len()];
        all.extend_from_slice(rows);
        Grid::from_rows(&all)
    }

    #[test]
    fn test_three_connected_is_not_a_match() {
        let grid = pad(&["0.....", "00...."]);
        let pass = find_matches(&grid, 4);
        assert!(pass.is_empty());
        assert_eq!(pass.score_delta, 0);
    }

    #[test]
    fn test_four_connected_is_a_match_worth_40() {
        let grid = pad(&["0.....", "000..."]);
        let pass = find_matches(&grid, 4);
        assert_eq!(pass.groups.len(), 1);
        assert_eq!(pass.groups[0].kind, TokenKind(0));
        assert_eq!(pass.groups[0].cells, vec![(0, 10), (0, 11), (1, 11), (2, 11)]);
        assert_eq!(pass.score_delta, 40);
    }

    #[test]
    fn test_diagonal_does_not_connect() {
        let grid = pad(&["0.0...", ".0.0.."]);
        assert!(find_matches(&grid, 4).is_empty());
    }

    #[test]
    fn test_disjoint_groups_found_in_one_pass() {
        let grid = pad(&["11.222", "11.222"]);
        let pass = find_matches(&grid, 4);
        assert_eq!(pass.groups.len(), 2);
        assert_eq!(pass.token_count(), 10);
        assert_eq!(pass.score_delta, 100);
        assert_eq!(pass.cells().len(), 10);
    }

    #[test]
    fn test_different_kinds_do_not_merge() {
        let grid = pad(&["0011..", "0011.."]);
        let pass = find_matches(&grid, 4);
        assert_eq!(pass.groups.len(), 2);
        assert!(pass.groups.iter().all(|g| g.len() == 4));
    }

    #[test]
    fn test_large_snake_group() {
        let grid = Grid::from_rows(&[
            "000000", ".....0", "000000", "0.....", "000000", ".....0", "000000", "0.....",
            "000000", ".....0", "000000", "0.....",
        ]);
        let pass = find_matches(&grid, 4);
        assert_eq!(pass.groups.len(), 1);
        assert_eq!(pass.groups[0].len(), grid.occupied_count());
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        // Few kinds on a small grid so groups form often.
        proptest::collection::vec(proptest::option::weighted(0.7, 0u8..3), 6 * 12).prop_map(
            |cells| {
                let mut grid = Grid::new(6, 12);
                for (i, c) in cells.into_iter().enumerate() {
                    grid.set(i % 6, i / 6, c.map(TokenKind));
                }
                grid
            },
        )
    }

    proptest! {
        #[test]
        fn prop_scan_order_does_not_change_result(
            grid in arb_grid(),
            order in Just((0..12usize).flat_map(|y| (0..6usize).map(move |x| (x, y))).collect::<Vec<_>>())
                .prop_shuffle(),
        ) {
            let row_major = find_matches(&grid, 4);
            let shuffled = find_matches_with_order(&grid, 4, order);
            prop_assert_eq!(row_major, shuffled);
        }

        #[test]
        fn prop_every_group_is_one_kind_and_large_enough(grid in arb_grid()) {
            let pass = find_matches(&grid, 4);
            let mut total = 0;
            for group in &pass.groups {
                prop_assert!(group.len() >= 4);
                for &(x, y) in &group.cells {
                    prop_assert_eq!(grid.get(x, y), Some(group.kind));
                }
                total += group.len() as u64 * 10;
            }
            prop_assert_eq!(pass.score_delta, total);
        }
    }
}
