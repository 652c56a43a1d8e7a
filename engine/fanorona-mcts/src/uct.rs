//! The time-budgeted UCT rollout agent.
//!
//! One decision runs as many playouts as the wall-clock budget allows.
//! Selection happens at root depth only; everything below the chosen child
//! is folded into a uniform-random rollout. The move with the best win
//! ratio is played.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use fanorona_core::{Board, CellState, Move, Outcome};

use crate::config::{ConfigError, UctConfig};
use crate::error::SearchError;
use crate::node::{Node, NodeId};
use crate::tree::Tree;

pub struct UctAgent {
    config: UctConfig,
    rng: ChaCha20Rng,
}

impl UctAgent {
    pub fn new(config: UctConfig) -> Result<UctAgent, ConfigError> {
        config.validate()?;
        Ok(UctAgent {
            config,
            rng: ChaCha20Rng::from_entropy(),
        })
    }

    /// Deterministic construction for tests and reproducible matches.
    pub fn with_seed(config: UctConfig, seed: u64) -> Result<UctAgent, ConfigError> {
        config.validate()?;
        Ok(UctAgent {
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    /// Run playouts until the decision budget expires and return the root
    /// move with the highest win ratio. The caller's board is not touched.
    pub fn choose_action(&mut self, board: &Board) -> Result<Move, SearchError> {
        if board.outcome().is_some() {
            return Err(SearchError::TerminalPosition);
        }

        let side = board.side_to_move();
        let mut tree = Tree::new(side);
        let root = tree.root();

        let moves = board.legal_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        for mv in moves {
            tree.add_child(Node::new_child(root, side, mv, 1.0));
        }

        let deadline = Instant::now() + self.config.decision_budget;
        let mut iterations = 0u32;
        while Instant::now() < deadline {
            let child = match tree.select_child_uct(root, self.config.exploration_constant) {
                Some(child) => child,
                None => break,
            };
            let first_move = tree.get(child).action.ok_or(SearchError::NoLegalActions)?;

            let winner = self.rollout(board, first_move);
            tree.backpropagate_wins(child, winner);
            iterations += 1;

            trace!(iteration = iterations, ?winner, "playout finished");
        }

        let best = self.best_by_win_ratio(&tree, root)?;
        let best_node = tree.get(best);
        debug!(
            iterations,
            action = %best_node.action.map(|m| m.to_string()).unwrap_or_default(),
            wins = best_node.value_sum,
            visits = best_node.visit_count,
            "UCT decision"
        );
        best_node.action.ok_or(SearchError::DecisionBudgetExhausted)
    }

    /// Play the selected move, then uniform-random legal moves until the
    /// game decides itself. A surrounded side loses; hitting the ply cap
    /// counts as a draw.
    fn rollout(&mut self, board: &Board, first_move: Move) -> Option<CellState> {
        let mut board = board.clone();
        board.apply(first_move);

        let mut plies = 0u32;
        loop {
            match board.outcome() {
                Some(Outcome::Win(side)) => return Some(side),
                Some(Outcome::Draw) => return None,
                None => {}
            }
            if plies >= self.config.max_rollout_plies {
                return None;
            }

            let moves = board.legal_moves();
            if moves.is_empty() {
                return Some(board.side_to_move().opponent());
            }
            let mv = moves[self.rng.gen_range(0..moves.len())];
            board.apply(mv);
            plies += 1;
        }
    }

    /// The visited root child with the highest win ratio, in insertion
    /// order on ties. Fails only when the budget expired before any child
    /// was tried.
    fn best_by_win_ratio(&self, tree: &Tree, root: NodeId) -> Result<NodeId, SearchError> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &tree.get(root).children {
            if let Some(ratio) = tree.get(child).win_ratio() {
                match best {
                    Some((_, best_ratio)) if ratio <= best_ratio => {}
                    _ => best = Some((child, ratio)),
                }
            }
        }
        best.map(|(id, _)| id)
            .ok_or(SearchError::DecisionBudgetExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanorona_core::CaptureKind;
    use std::time::Duration;

    fn quick_config() -> UctConfig {
        UctConfig::default().with_decision_budget(Duration::from_millis(50))
    }

    #[test]
    fn rejects_invalid_exploration() {
        let config = quick_config().with_exploration_constant(5.0);
        assert!(UctAgent::new(config).is_err());
    }

    #[test]
    fn plays_a_legal_move_from_the_opening() {
        let board = Board::new(9).unwrap();
        let mut agent = UctAgent::with_seed(quick_config(), 7).unwrap();

        let action = agent.choose_action(&board).unwrap();
        assert!(board.legal_moves().contains(&action));
        // The opening offers captures, so the chosen move is one.
        assert!(action.capture.is_capture());
    }

    #[test]
    fn takes_a_forced_capture() {
        let mut board = Board::empty(5).unwrap();
        board.place(2, 0, CellState::O);
        board.place(2, 1, CellState::O);
        board.place(2, 2, CellState::X);

        let mut agent = UctAgent::with_seed(quick_config(), 11).unwrap();
        let action = agent.choose_action(&board).unwrap();
        assert_eq!(action.capture, CaptureKind::Withdrawal);
    }

    #[test]
    fn surrounded_side_has_no_actions() {
        let mut board = Board::empty(5).unwrap();
        board.place(0, 0, CellState::X);
        board.place(0, 1, CellState::O);
        board.place(1, 0, CellState::O);
        board.place(1, 1, CellState::O);

        let mut agent = UctAgent::with_seed(quick_config(), 3).unwrap();
        assert!(matches!(
            agent.choose_action(&board),
            Err(SearchError::NoLegalActions)
        ));
    }

    #[test]
    fn zero_budget_exhausts_the_decision() {
        let board = Board::new(5).unwrap();
        let config = quick_config().with_decision_budget(Duration::ZERO);
        let mut agent = UctAgent::with_seed(config, 3).unwrap();

        assert!(matches!(
            agent.choose_action(&board),
            Err(SearchError::DecisionBudgetExhausted)
        ));
    }

    #[test]
    fn refuses_finished_games() {
        let mut board = Board::empty(5).unwrap();
        board.place(2, 2, CellState::X);

        let mut agent = UctAgent::with_seed(quick_config(), 3).unwrap();
        assert!(matches!(
            agent.choose_action(&board),
            Err(SearchError::TerminalPosition)
        ));
    }
}
