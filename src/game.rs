//! Game session: validity checks, player input, gravity, lock/clear/spawn and game over.

use crate::GameConfig;
use crate::board::Board;
use crate::piece::Piece;
use crate::shapes::{pick_random_color, pick_random_shape};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

/// Default time between gravity steps.
pub const DEFAULT_GRAVITY_INTERVAL_MS: u64 = 500;

/// True if every occupied cell of `piece` is inside the side walls, above the
/// floor, and over an empty board cell. Cells above the top edge are allowed.
pub fn is_valid(piece: &Piece, board: &Board) -> bool {
    piece.cells().all(|(px, py)| {
        if px < 0 || px >= board.width() as i32 || py >= board.height() as i32 {
            return false;
        }
        py < 0 || !board.get(px as usize, py as usize).is_some_and(|c| c.is_filled())
    })
}

/// Player input the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Falling,
    GameOver,
}

/// What a gravity check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Interval not elapsed yet, or the session is over.
    Idle,
    Fell,
    Locked { rows_cleared: u32 },
    /// The lock left a cell in the top row.
    GameOver { rows_cleared: u32 },
}

/// Read-only view handed to the renderer once per frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    pub current: &'a Piece,
    pub next: &'a Piece,
    pub score: u32,
    pub pieces_locked: u32,
    pub state: SessionState,
}

/// One game from first spawn to game over.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current: Piece,
    next: Piece,
    state: SessionState,
    rng: Pcg32,
    /// Id handed to the next spawned piece.
    next_id: u64,
    gravity_interval_ms: u64,
    last_fall_ms: u64,
    pieces_locked: u32,
}

impl GameSession {
    /// Fresh board with a current and a queued piece; the gravity timer starts at `now_ms`.
    pub fn new(config: &GameConfig, now_ms: u64) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::new();
        let current = draw_piece(&mut rng, 0, board.width());
        let next = draw_piece(&mut rng, 1, board.width());
        Self {
            board,
            current,
            next,
            state: SessionState::Falling,
            rng,
            next_id: 2,
            gravity_interval_ms: config.gravity_interval_ms,
            last_fall_ms: now_ms,
            pieces_locked: 0,
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.board.score()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board: &self.board,
            current: &self.current,
            next: &self.next,
            score: self.board.score(),
            pieces_locked: self.pieces_locked,
            state: self.state,
        }
    }

    /// Restart the gravity interval from `now_ms` (used when resuming from pause).
    pub fn reset_gravity_timer(&mut self, now_ms: u64) {
        self.last_fall_ms = now_ms;
    }

    /// One frame: every input in order, then a single gravity check.
    pub fn frame<I>(&mut self, inputs: I, now_ms: u64) -> Tick
    where
        I: IntoIterator<Item = Input>,
    {
        for input in inputs {
            self.apply(input);
        }
        self.tick(now_ms)
    }

    /// Apply one input if the resulting position is valid. Never locks.
    pub fn apply(&mut self, input: Input) {
        if self.is_game_over() {
            return;
        }
        let candidate = match input {
            Input::MoveLeft => self.current.translated(-1, 0),
            Input::MoveRight => self.current.translated(1, 0),
            Input::SoftDrop => self.current.translated(0, 1),
            Input::Rotate => self.current.rotated(),
            Input::HardDrop => return self.hard_drop(),
        };
        self.try_commit(candidate);
    }

    /// Gravity check. Falls one row once more than the interval has passed
    /// since the last check that fired; locks if the row below is blocked.
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        if self.is_game_over() || now_ms.saturating_sub(self.last_fall_ms) <= self.gravity_interval_ms
        {
            return Tick::Idle;
        }
        self.last_fall_ms = now_ms;
        let candidate = self.current.translated(0, 1);
        if is_valid(&candidate, &self.board) {
            self.current = candidate;
            return Tick::Fell;
        }
        self.lock_piece()
    }

    fn try_commit(&mut self, candidate: Piece) -> bool {
        if is_valid(&candidate, &self.board) {
            self.current = candidate;
            true
        } else {
            false
        }
    }

    /// Slide down to the last valid row; the next gravity check locks it there.
    fn hard_drop(&mut self) {
        while self.try_commit(self.current.translated(0, 1)) {}
    }

    fn lock_piece(&mut self) -> Tick {
        self.board.place(&self.current);
        let rows_cleared = self.board.clear_full_rows();
        self.pieces_locked += 1;

        let fresh = self.spawn_piece();
        self.current = std::mem::replace(&mut self.next, fresh);

        if self.board.is_game_over() {
            self.state = SessionState::GameOver;
            Tick::GameOver { rows_cleared }
        } else {
            Tick::Locked { rows_cleared }
        }
    }

    fn spawn_piece(&mut self) -> Piece {
        let piece = draw_piece(&mut self.rng, self.next_id, self.board.width());
        self.next_id += 1;
        piece
    }
}

fn draw_piece(rng: &mut Pcg32, id: u64, board_width: usize) -> Piece {
    let kind = pick_random_shape(rng);
    let color = pick_random_color(rng);
    Piece::spawn(id, kind, color, board_width)
}
