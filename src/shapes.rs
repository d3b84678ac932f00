//! Shape catalog: the seven piece geometries and the piece colour palette.

use rand::Rng;

/// Piece kinds in catalog order (I, T, O, Z, S, L, J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    I,
    T,
    O,
    Z,
    S,
    L,
    J,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::I, Self::T, Self::O, Self::Z, Self::S, Self::L, Self::J];

    /// Spawn orientation as rows of 0/1 cells, top row first.
    pub fn matrix(&self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::T => &[&[1, 1, 1], &[0, 1, 0]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::L => &[&[1, 1, 1], &[1, 0, 0]],
            Self::J => &[&[1, 1, 1], &[0, 0, 1]],
        }
    }
}

/// Opaque colour of a piece and of the board cells it leaves behind.
///
/// The theme decides what each id looks like; the engine only compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(u8);

impl ColorId {
    /// Number of piece colours (background excluded).
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
    ];

    /// Palette slot 0..COUNT.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Uniform pick from the catalog. Draws are independent; repeats are allowed.
pub fn pick_random_shape<R: Rng + ?Sized>(rng: &mut R) -> ShapeKind {
    ShapeKind::ALL[rng.random_range(0..ShapeKind::ALL.len())]
}

/// Uniform pick from the non-background palette.
pub fn pick_random_color<R: Rng + ?Sized>(rng: &mut R) -> ColorId {
    ColorId::ALL[rng.random_range(0..ColorId::COUNT)]
}
