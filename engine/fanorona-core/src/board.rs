//! Board state, legal-move generation and move execution.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::action::{CaptureKind, Direction, Move};
use crate::cell::CellState;
use crate::{HISTORY_LEN, MAX_COLS, ROWS};

/// Fixed-shape cell storage. Boards narrower than [`MAX_COLS`] leave the
/// trailing columns permanently empty.
pub(crate) type Grid = [[CellState; MAX_COLS]; ROWS];

/// Errors raised when constructing a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("unsupported board width {0}, expected 5 or 9")]
    InvalidWidth(usize),
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(CellState),
    /// Both sides without pieces. Unreachable from legal play (every
    /// capture leaves the mover on the board) but reported as a draw
    /// rather than picking an arbitrary winner.
    Draw,
}

/// A Fanorona position: the cell grid, the side to move, and the state of
/// any capture chain in progress.
///
/// The board is the single source of truth for whose turn it is:
/// [`apply`](Board::apply) keeps the turn after a capture (the chain may
/// continue) and yields it otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Grid,
    width: usize,
    side_to_move: CellState,
    /// Squares visited by the chaining piece, origin first. Non-empty
    /// exactly while a capture chain is in progress.
    path: Vec<(u8, u8)>,
    /// Square the chaining piece may not enter next, set from the second
    /// hop of a chain onward.
    restricted: Option<(u8, u8)>,
    /// Most-recent-first snapshots of the grid before each executed move,
    /// kept for the position encoder.
    history: VecDeque<Grid>,
}

impl Board {
    /// Create a board in the canonical opening position for the given
    /// width (5 for fanorona-5, 9 for fanorona-9).
    pub fn new(width: usize) -> Result<Board, BoardError> {
        let mut board = Board::empty(width)?;

        for col in 0..width {
            board.cells[0][col] = CellState::X;
            board.cells[1][col] = CellState::X;
            board.cells[3][col] = CellState::O;
            board.cells[4][col] = CellState::O;
        }
        // The middle row alternates around an empty centre-ish cell.
        let middle: &[CellState] = if width == 5 {
            use CellState::{Empty, O, X};
            &[O, X, Empty, O, X]
        } else {
            use CellState::{Empty, O, X};
            &[X, O, X, O, Empty, X, O, X, O]
        };
        board.cells[2][..width].copy_from_slice(middle);

        Ok(board)
    }

    /// Create an empty board. Used for composing test positions and by
    /// [`new`](Board::new).
    pub fn empty(width: usize) -> Result<Board, BoardError> {
        if width != 5 && width != 9 {
            return Err(BoardError::InvalidWidth(width));
        }
        Ok(Board {
            cells: [[CellState::Empty; MAX_COLS]; ROWS],
            width,
            side_to_move: CellState::X,
            path: Vec::new(),
            restricted: None,
            history: VecDeque::new(),
        })
    }

    /// Put a cell state on a square, overwriting whatever was there.
    pub fn place(&mut self, x: usize, y: usize, state: CellState) {
        debug_assert!(x < ROWS && y < self.width);
        self.cells[x][y] = state;
    }

    /// Override the side to move. Clears any chain in progress.
    pub fn set_side_to_move(&mut self, side: CellState) {
        debug_assert!(side.is_piece());
        self.side_to_move = side;
        self.path.clear();
        self.restricted = None;
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn side_to_move(&self) -> CellState {
        self.side_to_move
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> CellState {
        self.cells[x][y]
    }

    /// Squares visited by the chaining piece this turn, origin first.
    /// Empty between turns.
    #[inline]
    pub fn path(&self) -> &[(u8, u8)] {
        &self.path
    }

    /// The square the chaining piece is currently forbidden to enter.
    #[inline]
    pub fn restricted_square(&self) -> Option<(u8, u8)> {
        self.restricted
    }

    /// Whether a capture chain is in progress.
    #[inline]
    pub fn in_chain(&self) -> bool {
        !self.path.is_empty()
    }

    #[inline]
    fn in_bounds(&self, x: i16, y: i16) -> bool {
        x >= 0 && (x as usize) < ROWS && y >= 0 && (y as usize) < self.width
    }

    #[inline]
    fn cell_at(&self, x: i16, y: i16) -> CellState {
        self.cells[x as usize][y as usize]
    }

    pub fn piece_count(&self, side: CellState) -> usize {
        self.cells
            .iter()
            .flat_map(|row| &row[..self.width])
            .filter(|&&c| c == side)
            .count()
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.cells
    }

    pub(crate) fn history(&self) -> &VecDeque<Grid> {
        &self.history
    }

    /// Candidate directions from a square: orthogonals everywhere,
    /// diagonals only on strong intersections (`(x + y)` even), and the
    /// `Stay` pass only while a chain is in progress.
    fn candidate_directions(&self, x: u8, y: u8) -> impl Iterator<Item = Direction> {
        let strong = (x + y) % 2 == 0;
        let moving: &'static [Direction] = if strong {
            &Direction::ALL_MOVING
        } else {
            &Direction::ORTHOGONAL
        };
        let stay: &'static [Direction] = if self.in_chain() {
            &[Direction::Stay]
        } else {
            &[]
        };
        moving.iter().chain(stay.iter()).copied()
    }

    /// All legal moves for the side to move.
    ///
    /// Implements the mandatory-capture rule: outside a chain, if any
    /// capture exists only captures are returned; inside a chain, only
    /// continuation captures and the end-of-chain `Stay` are returned.
    /// An empty result means the side to move is surrounded.
    pub fn legal_moves(&self) -> Vec<Move> {
        let side = self.side_to_move;
        let mut moves = Vec::new();

        let width = self.width as u8;
        let origins: Box<dyn Iterator<Item = (u8, u8)>> = match self.path.last().copied() {
            Some(square) => Box::new(std::iter::once(square)),
            None => Box::new((0..ROWS as u8).flat_map(move |x| (0..width).map(move |y| (x, y)))),
        };

        for (x, y) in origins {
            if self.cells[x as usize][y as usize] != side {
                continue;
            }
            for dir in self.candidate_directions(x, y) {
                if dir == Direction::Stay {
                    moves.push(Move::new(x, y, dir, CaptureKind::EndChain));
                    continue;
                }
                let (dx, dy) = dir.offset();
                let (dest_x, dest_y) = (x as i16 + dx, y as i16 + dy);
                if !self.in_bounds(dest_x, dest_y)
                    || self.restricted == Some((dest_x as u8, dest_y as u8))
                    || self.path.contains(&(dest_x as u8, dest_y as u8))
                    || self.cell_at(dest_x, dest_y) != CellState::Empty
                {
                    continue;
                }

                let enemy = side.opponent();
                // Approach: the enemy line starts one step past the
                // destination. Withdrawal: one step behind the origin.
                let (fwd_x, fwd_y) = (dest_x + dx, dest_y + dy);
                let (bwd_x, bwd_y) = (x as i16 - dx, y as i16 - dy);

                let mut took = false;
                if self.in_bounds(fwd_x, fwd_y) && self.cell_at(fwd_x, fwd_y) == enemy {
                    moves.push(Move::new(x, y, dir, CaptureKind::Approach));
                    took = true;
                }
                if self.in_bounds(bwd_x, bwd_y) && self.cell_at(bwd_x, bwd_y) == enemy {
                    moves.push(Move::new(x, y, dir, CaptureKind::Withdrawal));
                    took = true;
                }
                if !took {
                    moves.push(Move::new(x, y, dir, CaptureKind::Paika));
                }
            }
        }

        if self.path.is_empty() {
            if moves.iter().any(|m| m.capture.is_capture()) {
                moves.retain(|m| m.capture.is_capture());
            }
        } else {
            moves.retain(|m| m.capture != CaptureKind::Paika);
        }

        moves
    }

    /// Execute a move for the side to move.
    ///
    /// The move must come from [`legal_moves`](Board::legal_moves); this is
    /// not re-checked. Captures keep the turn and extend the chain state;
    /// paika and end-of-chain moves clear it and yield the turn.
    pub fn apply(&mut self, mv: Move) {
        let side = self.side_to_move;
        debug_assert_eq!(self.cells[mv.x as usize][mv.y as usize], side);

        let snapshot = self.cells;
        let (dest_x, dest_y) = mv.destination();
        debug_assert!(self.in_bounds(dest_x, dest_y));

        self.cells[mv.x as usize][mv.y as usize] = CellState::Empty;
        self.cells[dest_x as usize][dest_y as usize] = side;

        if mv.capture.is_capture() {
            if self.path.is_empty() {
                self.path.push((mv.x, mv.y));
            } else {
                // From the second hop on, the square two steps out along
                // the move direction is barred, so the piece cannot run
                // twice along the same line.
                let (dx, dy) = mv.direction.offset();
                let (restr_x, restr_y) = (mv.x as i16 + 2 * dx, mv.y as i16 + 2 * dy);
                self.restricted = if self.in_bounds(restr_x, restr_y) {
                    Some((restr_x as u8, restr_y as u8))
                } else {
                    None
                };
            }
            self.path.push((dest_x as u8, dest_y as u8));
            self.sweep_captures(mv, side);
        } else {
            self.path.clear();
            self.restricted = None;
            self.side_to_move = side.opponent();
        }

        self.history.push_front(snapshot);
        self.history.truncate(HISTORY_LEN);
    }

    /// Remove the contiguous enemy line hit by a capture, walking outward
    /// until a friendly piece, an empty square or the edge.
    fn sweep_captures(&mut self, mv: Move, side: CellState) {
        let (dx, dy) = mv.direction.offset();
        let (mut tx, mut ty, step_x, step_y) = match mv.capture {
            CaptureKind::Approach => (mv.x as i16 + 2 * dx, mv.y as i16 + 2 * dy, dx, dy),
            CaptureKind::Withdrawal => (mv.x as i16 - dx, mv.y as i16 - dy, -dx, -dy),
            _ => unreachable!("sweep only runs for capturing moves"),
        };

        let enemy = side.opponent();
        while self.in_bounds(tx, ty) && self.cell_at(tx, ty) == enemy {
            self.cells[tx as usize][ty as usize] = CellState::Empty;
            tx += step_x;
            ty += step_y;
        }
    }

    /// The game result, if any: a side with no pieces left has lost.
    pub fn outcome(&self) -> Option<Outcome> {
        let mut has_x = false;
        let mut has_o = false;
        for row in &self.cells {
            for &cell in &row[..self.width] {
                match cell {
                    CellState::X => has_x = true,
                    CellState::O => has_o = true,
                    CellState::Empty => {}
                }
            }
        }
        match (has_x, has_o) {
            (true, true) => None,
            (true, false) => Some(Outcome::Win(CellState::X)),
            (false, true) => Some(Outcome::Win(CellState::O)),
            (false, false) => Some(Outcome::Draw),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for (x, row) in self.cells.iter().enumerate() {
            for cell in &row[..self.width] {
                write!(f, "{} ", cell)?;
            }
            writeln!(f, "{}", x + 1)?;
        }
        for y in 0..self.width {
            write!(f, "{} ", (b'a' + y as u8) as char)?;
        }
        writeln!(f)
    }
}
