//! Playfield grid: locked cells, row clearing and the running score.

use crate::piece::Piece;
use crate::shapes::ColorId;
use std::collections::VecDeque;

/// Playfield width in cells.
pub const BOARD_WIDTH: usize = 10;
/// Playfield height in cells.
pub const BOARD_HEIGHT: usize = 20;

/// Single cell: empty or locked with a piece colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ColorId),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Grid of locked cells. y=0 is top; rows are stored [0..height].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
    score: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let rows = (0..BOARD_HEIGHT)
            .map(|_| vec![Cell::Empty; BOARD_WIDTH])
            .collect();
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            rows,
            score: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum()
    }

    /// Write the piece's colour under each of its occupied cells.
    ///
    /// The caller must have checked the placement with [`crate::game::is_valid`];
    /// nothing is re-validated here and occupied cells are overwritten.
    pub fn place(&mut self, piece: &Piece) {
        for (px, py) in piece.cells() {
            if px >= 0 && py >= 0 {
                self.set(px as usize, py as usize, Cell::Filled(piece.color));
            }
        }
    }

    /// Drop every full row, refill from the top with empty rows, and add the
    /// number removed to the score. Returns that number.
    pub fn clear_full_rows(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().all(|c| c.is_filled()));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        let cleared = cleared as u32;
        self.score += cleared;
        cleared
    }

    /// Top row holds a locked cell.
    pub fn is_game_over(&self) -> bool {
        self.rows
            .front()
            .is_some_and(|row| row.iter().any(|c| c.is_filled()))
    }
}
