//! Falling piece: shape matrix, anchor, colour, and the candidate moves built from it.

use crate::shapes::{ColorId, ShapeKind};

/// Rectangular boolean matrix; `rows[0]` is the top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_kind(kind: ShapeKind) -> Self {
        let rows = kind
            .matrix()
            .iter()
            .map(|row| row.iter().map(|&c| c != 0).collect())
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Occupied cells as (col, row) offsets from the top-left corner.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(j, _)| (j, i))
        })
    }

    /// 90° clockwise: output row `i`, column `j` is input row `n - j`, column `i`.
    pub fn rotated_cw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let rows = (0..w)
            .map(|i| (0..h).map(|j| self.rows[h - 1 - j][i]).collect())
            .collect();
        Self { rows }
    }
}

/// A live piece. Moves never mutate it; they return a candidate to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Serial number within a session; distinguishes two pieces of the same kind.
    pub id: u64,
    pub shape: Shape,
    pub color: ColorId,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Horizontally centred on the board, top row at `y = 0`. Not validated.
    pub fn spawn(id: u64, kind: ShapeKind, color: ColorId, board_width: usize) -> Self {
        let shape = Shape::from_kind(kind);
        let x = (board_width / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            id,
            shape,
            color,
            x,
            y: 0,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Clockwise turn about the anchor; the anchor stays the new matrix's top-left corner.
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..self.clone()
        }
    }

    /// Absolute board coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .offsets()
            .map(|(j, i)| (self.x + j as i32, self.y + i as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(rows: &[&[u8]]) -> Shape {
        Shape {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|&c| c != 0).collect())
                .collect(),
        }
    }

    #[test]
    fn test_spawn_is_centred_at_top() {
        let i = Piece::spawn(0, ShapeKind::I, ColorId::ALL[0], 10);
        assert_eq!((i.x, i.y), (3, 0));
        let o = Piece::spawn(1, ShapeKind::O, ColorId::ALL[0], 10);
        assert_eq!((o.x, o.y), (4, 0));
        let t = Piece::spawn(2, ShapeKind::T, ColorId::ALL[0], 10);
        assert_eq!((t.x, t.y), (4, 0));
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for kind in ShapeKind::ALL {
            let original = Shape::from_kind(kind);
            let mut s = original.clone();
            for _ in 0..4 {
                s = s.rotated_cw();
            }
            assert_eq!(s, original, "{kind:?}");
        }
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let i = Shape::from_kind(ShapeKind::I);
        let r = i.rotated_cw();
        assert_eq!((r.width(), r.height()), (1, 4));
        assert_eq!((i.width(), i.height()), (4, 1));
    }

    #[test]
    fn test_rotate_clockwise_orientation() {
        // L: [1 1 1] / [1 0 0]  ->  [1 1] / [0 1] / [0 1]
        let l = Shape::from_kind(ShapeKind::L).rotated_cw();
        assert_eq!(l, shape(&[&[1, 1], &[0, 1], &[0, 1]]));
        // T: [1 1 1] / [0 1 0]  ->  [0 1] / [1 1] / [0 1]
        let t = Shape::from_kind(ShapeKind::T).rotated_cw();
        assert_eq!(t, shape(&[&[0, 1], &[1, 1], &[0, 1]]));
    }

    #[test]
    fn test_candidates_leave_original_untouched() {
        let p = Piece::spawn(0, ShapeKind::S, ColorId::ALL[2], 10);
        let moved = p.translated(-1, 2);
        let turned = p.rotated();
        assert_eq!((p.x, p.y), (4, 0));
        assert_eq!((moved.x, moved.y), (3, 2));
        assert_eq!(p.shape, Shape::from_kind(ShapeKind::S));
        assert_eq!((turned.x, turned.y), (p.x, p.y));
        assert_ne!(turned.shape, p.shape);
        assert_eq!(moved.id, p.id);
    }

    #[test]
    fn test_cells_are_absolute() {
        let p = Piece::spawn(0, ShapeKind::Z, ColorId::ALL[0], 10).translated(0, 5);
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(cells, vec![(4, 5), (5, 5), (5, 6), (6, 6)]);
    }
}
