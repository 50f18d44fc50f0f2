//! Playfield grid: fixed-size matrix of vacant or token-typed cells.

use std::fmt;

/// Identifies one of the active token kinds (`0..token_kinds`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(pub u8);

impl TokenKind {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Grid of cells. y=0 is the top row, `height - 1` is the floor row.
///
/// `get`/`set` panic on out-of-range coordinates: every caller is expected to
/// bounds-check first (see [`Grid::contains`]).
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, `cells[y * width + x]`.
    cells: Vec<Option<TokenKind>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Build a grid from text rows, top row first. `.` is vacant, `0`-`9`
    /// are kinds 0-9 and `a`-`j` are kinds 10-19.
    ///
    /// Panics if rows are ragged or contain any other character.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.chars().count(), width, "ragged row {y}: {row:?}");
            for (x, c) in row.chars().enumerate() {
                let cell = match c {
                    '.' => None,
                    '0'..='9' => Some(TokenKind(c as u8 - b'0')),
                    'a'..='j' => Some(TokenKind(c as u8 - b'a' + 10)),
                    _ => panic!("unexpected cell {c:?} at ({x}, {y})"),
                };
                grid.set(x, y, cell);
            }
        }
        grid
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// True if the signed coordinate lies inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<TokenKind> {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Option<TokenKind>) {
        let i = self.index(x, y);
        self.cells[i] = cell;
    }

    #[inline]
    pub fn is_vacant(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_none()
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells as `(x, y, kind)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TokenKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|k| (i % self.width, i / self.width, k)))
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.width, self.height)?;
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                let c = match cell {
                    None => '.',
                    Some(TokenKind(k @ 0..=9)) => char::from(b'0' + k),
                    Some(TokenKind(k @ 10..=19)) => char::from(b'a' + k - 10),
                    Some(_) => '#',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(6, 12);
        assert_eq!((grid.width(), grid.height()), (6, 12));
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.is_vacant(5, 11));
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(6, 12);
        grid.set(2, 3, Some(TokenKind(1)));
        assert_eq!(grid.get(2, 3), Some(TokenKind(1)));
        grid.set(2, 3, None);
        assert_eq!(grid.get(2, 3), None);
    }

    #[test]
    fn test_from_rows() {
        let grid = Grid::from_rows(&["..a", "01."]);
        assert_eq!(grid.get(2, 0), Some(TokenKind(10)));
        assert_eq!(grid.get(0, 1), Some(TokenKind(0)));
        assert_eq!(grid.get(1, 1), Some(TokenKind(1)));
        assert_eq!(grid.occupied_count(), 3);
        let cells: Vec<_> = grid.iter().collect();
        assert_eq!(
            cells,
            vec![(2, 0, TokenKind(10)), (0, 1, TokenKind(0)), (1, 1, TokenKind(1))]
        );
    }

    #[test]
    fn test_contains_signed() {
        let grid = Grid::new(6, 12);
        assert!(grid.contains(0, 0));
        assert!(grid.contains(5, 11));
        assert!(!grid.contains(-1, 0));
        assert!(!grid.contains(0, -1));
        assert!(!grid.contains(6, 0));
        assert!(!grid.contains(0, 12));
    }

    #[test]
    #[should_panic(expected = "outside 6x12 grid")]
    fn test_out_of_bounds_get_panics() {
        let grid = Grid::new(6, 12);
        let _ = grid.get(6, 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_set_panics() {
        let mut grid = Grid::new(6, 12);
        grid.set(0, 12, Some(TokenKind(0)));
    }
}
