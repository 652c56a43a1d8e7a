//! Tensor encoding of positions for policy/value evaluators.
//!
//! Evaluators see a position as an 11-plane `f32` stack plus a 0/1 legality
//! mask over the shared 1800-entry action space. Planes are laid out
//! row-major, current side first:
//!
//! | plane | content |
//! |---|---|
//! | 0, 1 | side-to-move pieces, opponent pieces |
//! | 2..=9 | the same pair for the 4 most recent past positions |
//! | 10 | constant side flag: 0.0 when `X` is to move, 1.0 when `O` |
//!
//! Past positions beyond the recorded history stay zero.

use crate::board::{Board, Grid};
use crate::cell::CellState;
use crate::{ACTION_SPACE, HISTORY_LEN, PLANE_COUNT, ROWS};

/// A board encoded for evaluation: `planes` has shape
/// `11 x 5 x width` flattened row-major, `legal_mask` is the 0/1 tensor
/// over the flat action space.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPosition {
    pub planes: Vec<f32>,
    pub legal_mask: Vec<f32>,
    pub width: usize,
}

impl EncodedPosition {
    pub fn from_board(board: &Board) -> EncodedPosition {
        let width = board.width();
        let plane_len = ROWS * width;
        let mut planes = vec![0.0f32; PLANE_COUNT * plane_len];

        let me = board.side_to_move();
        let them = me.opponent();

        fill_piece_planes(&mut planes[..2 * plane_len], board.grid(), me, them, width);
        for (i, grid) in board.history().iter().take(HISTORY_LEN).enumerate() {
            let offset = (2 + 2 * i) * plane_len;
            fill_piece_planes(
                &mut planes[offset..offset + 2 * plane_len],
                grid,
                me,
                them,
                width,
            );
        }

        let flag = if me == CellState::O { 1.0 } else { 0.0 };
        planes[(PLANE_COUNT - 1) * plane_len..].fill(flag);

        let mut legal_mask = vec![0.0f32; ACTION_SPACE];
        for mv in board.legal_moves() {
            legal_mask[mv.flat_index()] = 1.0;
        }

        EncodedPosition {
            planes,
            legal_mask,
            width,
        }
    }

    /// Number of floats in one plane.
    pub fn plane_len(&self) -> usize {
        ROWS * self.width
    }
}

/// Write a `(mine, theirs)` binary plane pair for one grid snapshot.
fn fill_piece_planes(dst: &mut [f32], grid: &Grid, me: CellState, them: CellState, width: usize) {
    let plane_len = ROWS * width;
    for (x, row) in grid.iter().enumerate() {
        for (y, &cell) in row[..width].iter().enumerate() {
            let at = x * width + y;
            if cell == me {
                dst[at] = 1.0;
            } else if cell == them {
                dst[plane_len + at] = 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Move;

    #[test]
    fn opening_planes_9() {
        let board = Board::new(9).unwrap();
        let enc = EncodedPosition::from_board(&board);
        assert_eq!(enc.planes.len(), PLANE_COUNT * 5 * 9);
        assert_eq!(enc.legal_mask.len(), ACTION_SPACE);

        let plane_len = enc.plane_len();
        // X to move: plane 0 holds the 22 X pieces, plane 1 the 22 O pieces.
        let mine: f32 = enc.planes[..plane_len].iter().sum();
        let theirs: f32 = enc.planes[plane_len..2 * plane_len].iter().sum();
        assert_eq!(mine, 22.0);
        assert_eq!(theirs, 22.0);

        // No history yet: planes 2..=9 are all zero.
        assert!(enc.planes[2 * plane_len..10 * plane_len]
            .iter()
            .all(|&v| v == 0.0));

        // X to move: the side flag plane is zero.
        assert!(enc.planes[10 * plane_len..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn side_flag_follows_turn() {
        let mut board = Board::new(5).unwrap();
        board.set_side_to_move(CellState::O);
        let enc = EncodedPosition::from_board(&board);
        let plane_len = enc.plane_len();
        assert!(enc.planes[10 * plane_len..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn history_planes_fill_in() {
        let mut board = Board::new(5).unwrap();
        let mv = board.legal_moves()[0];
        board.apply(mv);
        let enc = EncodedPosition::from_board(&board);
        let plane_len = enc.plane_len();
        // One past position recorded: planes 2-3 are populated, 4..=9 zero.
        let first_pair: f32 = enc.planes[2 * plane_len..4 * plane_len].iter().sum();
        assert!(first_pair > 0.0);
        assert!(enc.planes[4 * plane_len..10 * plane_len]
            .iter()
            .all(|&v| v == 0.0));
    }

    #[test]
    fn mask_marks_exactly_the_legal_moves() {
        let board = Board::new(9).unwrap();
        let moves = board.legal_moves();
        let enc = EncodedPosition::from_board(&board);
        let ones = enc.legal_mask.iter().filter(|&&v| v == 1.0).count();
        assert_eq!(ones, moves.len());
        for mv in &moves {
            assert_eq!(enc.legal_mask[mv.flat_index()], 1.0);
        }
        // And nothing else is set.
        let marked: std::collections::HashSet<usize> =
            moves.iter().map(Move::flat_index).collect();
        for (i, &v) in enc.legal_mask.iter().enumerate() {
            if !marked.contains(&i) {
                assert_eq!(v, 0.0);
            }
        }
    }
}
