//! Translation and rotation of the falling pair against the grid.

use crate::grid::Grid;
use crate::piece::{Cell, Piece};

/// Offsets tried, in order, when a plain rotation collides: left, right, up.
pub const KICK_OFFSETS: [(i32, i32); 3] = [(-1, 0), (1, 0), (0, -1)];

/// True if every cell is inside the side walls, above the floor, and not on
/// an occupied grid cell. Cells above the grid (y < 0) are never checked
/// against occupancy.
pub fn is_valid_position(grid: &Grid, cells: &[Cell]) -> bool {
    cells.iter().all(|&(x, y)| {
        if x < 0 || x as usize >= grid.width() || y >= grid.height() as i32 {
            return false;
        }
        y < 0 || grid.is_vacant(x as usize, y as usize)
    })
}

/// Shift the piece by `(dx, dy)`. Returns false and leaves it untouched if
/// the result would be invalid.
pub fn try_move(grid: &Grid, piece: &mut Piece, dx: i32, dy: i32) -> bool {
    let moved = piece.cells().map(|(x, y)| (x + dx, y + dy));
    if !is_valid_position(grid, &moved) {
        return false;
    }
    piece.place(moved, piece.rotation());
    true
}

/// Rotate the satellite a quarter turn clockwise about the pivot, falling
/// back to [`KICK_OFFSETS`]. Returns false and leaves the piece untouched if
/// no placement fits.
#[allow(clippy::similar_names)]
pub fn try_rotate(grid: &Grid, piece: &mut Piece) -> bool {
    let (px, py) = piece.pivot();
    let (rx, ry) = piece.offset();
    let rotated = [(px, py), (px - ry, py + rx)];
    let next_rotation = (piece.rotation() + 1) % 4;

    let candidates = std::iter::once((0, 0)).chain(KICK_OFFSETS);
    for (kx, ky) in candidates {
        let kicked = rotated.map(|(x, y)| (x + kx, y + ky));
        if is_valid_position(grid, &kicked) {
            piece.place(kicked, next_rotation);
            return true;
        }
    }
    false
}
