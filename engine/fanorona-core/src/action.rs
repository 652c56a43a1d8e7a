//! The Fanorona action model.
//!
//! A move is an origin square, one of nine keypad directions and a capture
//! kind. The integer `(dir, tar)` codes of the wire format survive only at
//! the evaluator boundary, through [`Move::flat_index`].

use std::fmt;

use crate::{DIR_COUNT, TAR_COUNT, Y_MAX};

/// One of the nine keypad directions:
///
/// ```text
/// 7 8 9        (-1,-1) (-1, 0) (-1,+1)
/// 4 5 6        ( 0,-1) ( 0, 0) ( 0,+1)
/// 1 2 3        (+1,-1) (+1, 0) (+1,+1)
/// ```
///
/// Rows grow downward, so `Down` increases `x`. `Stay` is the in-chain
/// pass that ends a capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    DownLeft,
    Down,
    DownRight,
    Left,
    Stay,
    Right,
    UpLeft,
    Up,
    UpRight,
}

impl Direction {
    /// All directions in keypad order, 1 through 9.
    pub const ALL: [Direction; 9] = [
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
        Direction::Left,
        Direction::Stay,
        Direction::Right,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
    ];

    /// The orthogonal directions, the only ones available from weak nodes.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ];

    /// All eight moving directions, available from strong nodes.
    pub const ALL_MOVING: [Direction; 8] = [
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
    ];

    /// The keypad code, 1..=9.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Direction::DownLeft => 1,
            Direction::Down => 2,
            Direction::DownRight => 3,
            Direction::Left => 4,
            Direction::Stay => 5,
            Direction::Right => 6,
            Direction::UpLeft => 7,
            Direction::Up => 8,
            Direction::UpRight => 9,
        }
    }

    /// Decode a keypad code.
    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            1..=9 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// `(dx, dy)` row/column offset of a single step.
    #[inline]
    pub fn offset(self) -> (i16, i16) {
        match self {
            Direction::DownLeft => (1, -1),
            Direction::Down => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::Left => (0, -1),
            Direction::Stay => (0, 0),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::Up => (-1, 0),
            Direction::UpRight => (-1, 1),
        }
    }

    /// Diagonal directions exist only on strong intersections.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::DownLeft | Direction::DownRight | Direction::UpLeft | Direction::UpRight
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::DownLeft => "down-left",
            Direction::Down => "down",
            Direction::DownRight => "down-right",
            Direction::Left => "left",
            Direction::Stay => "stay",
            Direction::Right => "right",
            Direction::UpLeft => "up-left",
            Direction::Up => "up",
            Direction::UpRight => "up-right",
        };
        f.write_str(name)
    }
}

/// What a move does to the opponent.
///
/// The wire codes are `-1` paika, `0` end-of-chain stay, `1` withdrawal,
/// `2` approach. Only withdrawal and approach remove pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Plain non-capturing move, legal only when no capture exists.
    Paika,
    /// The in-chain pass: stay put and end the capture sequence.
    EndChain,
    /// Capture the enemy line directly behind the origin.
    Withdrawal,
    /// Capture the enemy line directly ahead of the destination.
    Approach,
}

impl CaptureKind {
    /// The wire code, -1..=2.
    #[inline]
    pub fn code(self) -> i8 {
        match self {
            CaptureKind::Paika => -1,
            CaptureKind::EndChain => 0,
            CaptureKind::Withdrawal => 1,
            CaptureKind::Approach => 2,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: i8) -> Option<CaptureKind> {
        match code {
            -1 => Some(CaptureKind::Paika),
            0 => Some(CaptureKind::EndChain),
            1 => Some(CaptureKind::Withdrawal),
            2 => Some(CaptureKind::Approach),
            _ => None,
        }
    }

    /// Whether executing this move removes enemy pieces.
    #[inline]
    pub fn is_capture(self) -> bool {
        matches!(self, CaptureKind::Withdrawal | CaptureKind::Approach)
    }
}

/// A complete Fanorona action: origin square, direction, capture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// Origin row, 0..5 top to bottom.
    pub x: u8,
    /// Origin column, 0..width left to right.
    pub y: u8,
    pub direction: Direction,
    pub capture: CaptureKind,
}

impl Move {
    pub fn new(x: u8, y: u8, direction: Direction, capture: CaptureKind) -> Move {
        Move {
            x,
            y,
            direction,
            capture,
        }
    }

    /// The square the piece ends on. Equals the origin for `Stay`.
    #[inline]
    pub fn destination(&self) -> (i16, i16) {
        let (dx, dy) = self.direction.offset();
        (self.x as i16 + dx, self.y as i16 + dy)
    }

    /// Index into the shared `5 x 10 x 9 x 4` action space.
    ///
    /// The column extent is 10 even though no board is wider than 9; the
    /// unused slice keeps the index layout compatible across both board
    /// widths and with previously trained evaluators.
    #[inline]
    pub fn flat_index(&self) -> usize {
        let dir = (self.direction.code() - 1) as usize;
        let tar = (self.capture.code() + 1) as usize;
        self.x as usize * (Y_MAX * DIR_COUNT * TAR_COUNT)
            + self.y as usize * (DIR_COUNT * TAR_COUNT)
            + dir * TAR_COUNT
            + tar
    }

    /// Inverse of [`flat_index`](Self::flat_index). Returns `None` for
    /// indices outside the space. Indices in the unused column slice
    /// decode to squares no board contains; callers validate against a
    /// concrete board.
    pub fn from_flat_index(index: usize) -> Option<Move> {
        if index >= crate::ACTION_SPACE {
            return None;
        }
        let tar = (index % TAR_COUNT) as i8 - 1;
        let dir = ((index / TAR_COUNT) % DIR_COUNT) as u8 + 1;
        let y = (index / (TAR_COUNT * DIR_COUNT)) % Y_MAX;
        let x = index / (TAR_COUNT * DIR_COUNT * Y_MAX);
        Some(Move {
            x: x as u8,
            y: y as u8,
            direction: Direction::from_code(dir)?,
            capture: CaptureKind::from_code(tar)?,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rank as a 1-based number, file as a letter, matching the board
        // rendering.
        let file = (b'a' + self.y) as char;
        write!(f, "from ({}, {}) move {}", self.x + 1, file, self.direction)?;
        match self.capture {
            CaptureKind::Paika => Ok(()),
            CaptureKind::EndChain => write!(f, " and end the chain"),
            CaptureKind::Withdrawal => write!(f, " and take backward"),
            CaptureKind::Approach => write!(f, " and take forward"),
        }
    }
}
