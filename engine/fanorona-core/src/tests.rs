//! Rule-engine scenario and invariant tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::action::{CaptureKind, Direction, Move};
use crate::board::{Board, BoardError, Outcome};
use crate::cell::CellState;

#[test]
fn opening_position_5() {
    let board = Board::new(5).unwrap();
    assert_eq!(board.side_to_move(), CellState::X);
    assert_eq!(board.piece_count(CellState::X), 12);
    assert_eq!(board.piece_count(CellState::O), 12);
    assert_eq!(board.cell(2, 0), CellState::O);
    assert_eq!(board.cell(2, 1), CellState::X);
    assert_eq!(board.cell(2, 2), CellState::Empty);
    assert_eq!(board.cell(2, 3), CellState::O);
    assert_eq!(board.cell(2, 4), CellState::X);
}

#[test]
fn opening_position_9() {
    let board = Board::new(9).unwrap();
    assert_eq!(board.piece_count(CellState::X), 22);
    assert_eq!(board.piece_count(CellState::O), 22);
    // Row 2 alternates X O X O . X O X O.
    let expected = [
        CellState::X,
        CellState::O,
        CellState::X,
        CellState::O,
        CellState::Empty,
        CellState::X,
        CellState::O,
        CellState::X,
        CellState::O,
    ];
    for (y, &want) in expected.iter().enumerate() {
        assert_eq!(board.cell(2, y), want, "row 2 column {}", y);
    }
}

#[test]
fn rejects_unsupported_widths() {
    assert_eq!(Board::new(7).unwrap_err(), BoardError::InvalidWidth(7));
    assert_eq!(Board::new(0).unwrap_err(), BoardError::InvalidWidth(0));
}

#[test]
fn approach_capture_moves_and_sweeps() {
    // X on c3 with an O one step past the empty destination: the only
    // legal move is the approach capture to the right.
    let mut board = Board::empty(5).unwrap();
    board.place(2, 2, CellState::X);
    board.place(2, 4, CellState::O);

    let moves = board.legal_moves();
    let expected = Move::new(2, 2, Direction::Right, CaptureKind::Approach);
    assert_eq!(moves, vec![expected]);

    board.apply(expected);
    assert_eq!(board.cell(2, 3), CellState::X);
    assert_eq!(board.cell(2, 2), CellState::Empty);
    assert_eq!(board.cell(2, 4), CellState::Empty);
    assert_eq!(board.side_to_move(), CellState::X, "turn retained mid-chain");
    assert_eq!(board.path(), &[(2, 2), (2, 3)]);
}

#[test]
fn withdrawal_capture_sweeps_the_line_behind() {
    let mut board = Board::empty(5).unwrap();
    board.place(2, 0, CellState::O);
    board.place(2, 1, CellState::O);
    board.place(2, 2, CellState::X);

    let moves = board.legal_moves();
    let expected = Move::new(2, 2, Direction::Right, CaptureKind::Withdrawal);
    assert_eq!(moves, vec![expected]);

    board.apply(expected);
    assert_eq!(board.cell(2, 3), CellState::X);
    assert_eq!(board.cell(2, 0), CellState::Empty);
    assert_eq!(board.cell(2, 1), CellState::Empty);
}

#[test]
fn opening_9_offers_only_captures() {
    let board = Board::new(9).unwrap();
    let moves = board.legal_moves();
    assert!(!moves.is_empty());
    assert!(
        moves.iter().all(|m| m.capture.is_capture()),
        "captures exist at the 5x9 opening, so only captures are legal"
    );
    // One of them: the X on f3 stepping left into the centre, capturing
    // the O line by approach.
    assert!(moves.contains(&Move::new(2, 5, Direction::Left, CaptureKind::Approach)));
}

#[test]
fn weak_squares_never_move_diagonally() {
    let mut board = Board::empty(9).unwrap();
    board.place(0, 1, CellState::X);

    let moves = board.legal_moves();
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| !m.direction.is_diagonal()));
}

#[test]
fn chain_rejects_path_reentry_and_offers_stay() {
    // S1 state plus a spare O that is out of capture range, so the game
    // does not end with the first capture.
    let mut board = Board::empty(5).unwrap();
    board.place(2, 2, CellState::X);
    board.place(2, 4, CellState::O);
    board.place(4, 1, CellState::O);

    board.apply(Move::new(2, 2, Direction::Right, CaptureKind::Approach));
    assert!(board.in_chain());

    let moves = board.legal_moves();
    // Reversing left would land on (2,2), which is in the path.
    assert!(moves.iter().all(|m| m.direction != Direction::Left));
    // No continuation capture exists, so the only option is to end the
    // chain in place.
    let stay = Move::new(2, 3, Direction::Stay, CaptureKind::EndChain);
    assert_eq!(moves, vec![stay]);

    board.apply(stay);
    assert!(!board.in_chain());
    assert_eq!(board.side_to_move(), CellState::O);
    assert_eq!(board.restricted_square(), None);
}

#[test]
fn two_hop_chain_sets_restricted_square_and_wins() {
    let mut board = Board::empty(5).unwrap();
    board.place(2, 2, CellState::X);
    board.place(2, 4, CellState::O);
    board.place(0, 3, CellState::O);

    // First hop: no restricted square yet.
    board.apply(Move::new(2, 2, Direction::Right, CaptureKind::Approach));
    assert_eq!(board.restricted_square(), None);

    let moves = board.legal_moves();
    let second = Move::new(2, 3, Direction::Up, CaptureKind::Approach);
    assert!(moves.contains(&second));

    board.apply(second);
    // Second hop bars the square two steps out along the move direction.
    assert_eq!(board.restricted_square(), Some((0, 3)));
    assert_eq!(board.path(), &[(2, 2), (2, 3), (1, 3)]);

    // Both O pieces are gone: X wins.
    assert_eq!(board.piece_count(CellState::O), 0);
    assert_eq!(board.outcome(), Some(Outcome::Win(CellState::X)));
}

#[test]
fn paika_only_when_no_capture_exists() {
    let mut board = Board::empty(5).unwrap();
    board.place(0, 0, CellState::X);
    board.place(4, 4, CellState::O);

    let moves = board.legal_moves();
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| m.capture == CaptureKind::Paika));
}

#[test]
fn executor_is_deterministic() {
    let board = Board::new(9).unwrap();
    let mv = board.legal_moves()[0];

    let mut a = board.clone();
    let mut b = board.clone();
    a.apply(mv);
    b.apply(mv);
    assert_eq!(a, b);
}

#[test]
fn empty_board_reports_draw() {
    let board = Board::empty(5).unwrap();
    assert_eq!(board.outcome(), Some(Outcome::Draw));
}

/// Drive random games on both widths and check the generator/executor
/// invariants at every ply.
#[test]
fn random_playout_invariants() {
    for width in [5usize, 9] {
        for seed in 0..10u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut board = Board::new(width).unwrap();
            let mut plies = 0;

            while board.outcome().is_none() && plies < 300 {
                let moves = board.legal_moves();
                if board.in_chain() {
                    assert!(
                        !moves.is_empty(),
                        "a chain can always be ended (width={}, seed={})",
                        width,
                        seed
                    );
                }
                if moves.is_empty() {
                    // Surrounded: a natural loss, not an engine error.
                    break;
                }

                let side = board.side_to_move();
                let any_capture = moves.iter().any(|m| m.capture.is_capture());
                for m in &moves {
                    assert_eq!(
                        board.cell(m.x as usize, m.y as usize),
                        side,
                        "origin must hold the side to move"
                    );
                    if m.direction != Direction::Stay {
                        let (dx, dy) = m.destination();
                        assert_eq!(
                            board.cell(dx as usize, dy as usize),
                            CellState::Empty,
                            "destination must be empty"
                        );
                    }
                    if m.direction.is_diagonal() {
                        assert_eq!((m.x + m.y) % 2, 0, "diagonals only from strong squares");
                    }
                    if any_capture && !board.in_chain() {
                        assert!(
                            m.capture != CaptureKind::Paika,
                            "mandatory capture must filter paika moves"
                        );
                    }
                }

                let mv = moves[rng.gen_range(0..moves.len())];
                board.apply(mv);
                plies += 1;

                if mv.capture.is_capture() {
                    assert_eq!(board.side_to_move(), side, "captures keep the turn");
                    assert!(board.in_chain());
                } else {
                    assert_eq!(board.side_to_move(), side.opponent(), "turn passes");
                    assert!(!board.in_chain());
                    assert_eq!(board.restricted_square(), None);
                }
            }
        }
    }
}
