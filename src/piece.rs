//! The falling pair: a pivot cell and a satellite cell orbiting it.

use rand::Rng;

use crate::grid::TokenKind;

/// Signed cell coordinate; y may be negative above the visible grid.
pub type Cell = (i32, i32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// `[pivot, satellite]`.
    cells: [Cell; 2],
    tokens: [TokenKind; 2],
    /// Clockwise quarter turns applied so far, 0..4.
    rotation: u8,
}

impl Piece {
    /// Spawn column for a grid of the given width.
    pub const fn spawn_column(width: usize) -> i32 {
        (width / 2) as i32 - 1
    }

    /// New piece at the spawn position: pivot on row 0, satellite beneath it.
    pub const fn new(width: usize, tokens: [TokenKind; 2]) -> Self {
        let x = Self::spawn_column(width);
        Self {
            cells: [(x, 0), (x, 1)],
            tokens,
            rotation: 0,
        }
    }

    /// New piece with both kinds drawn independently and uniformly from `0..token_kinds`.
    pub fn random<R: Rng + ?Sized>(width: usize, token_kinds: usize, rng: &mut R) -> Self {
        let mut draw = || TokenKind(rng.random_range(0..token_kinds) as u8);
        let pivot = draw();
        let satellite = draw();
        Self::new(width, [pivot, satellite])
    }

    /// Piece at an arbitrary position, for setting up scenarios. The two
    /// cells must be orthogonal neighbours.
    pub fn at(pivot: Cell, satellite: Cell, tokens: [TokenKind; 2], rotation: u8) -> Self {
        debug_assert_eq!(
            (pivot.0 - satellite.0).abs() + (pivot.1 - satellite.1).abs(),
            1,
            "pivot {pivot:?} and satellite {satellite:?} are not adjacent"
        );
        Self {
            cells: [pivot, satellite],
            tokens,
            rotation: rotation % 4,
        }
    }

    #[inline]
    pub const fn cells(&self) -> [Cell; 2] {
        self.cells
    }

    #[inline]
    pub const fn pivot(&self) -> Cell {
        self.cells[0]
    }

    #[inline]
    pub const fn satellite(&self) -> Cell {
        self.cells[1]
    }

    #[inline]
    pub const fn tokens(&self) -> [TokenKind; 2] {
        self.tokens
    }

    #[inline]
    pub const fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Satellite position relative to the pivot.
    #[allow(clippy::similar_names)]
    pub const fn offset(&self) -> (i32, i32) {
        let (px, py) = self.pivot();
        let (sx, sy) = self.satellite();
        (sx - px, sy - py)
    }

    /// `(cell, kind)` pairs, pivot first.
    pub fn placed(&self) -> [(Cell, TokenKind); 2] {
        [(self.cells[0], self.tokens[0]), (self.cells[1], self.tokens[1])]
    }

    pub(crate) const fn place(&mut self, cells: [Cell; 2], rotation: u8) {
        self.cells = cells;
        self.rotation = rotation % 4;
    }
}
