//! The game loop: alternates players over one authoritative board.

use anyhow::Result;
use tracing::{info, warn};

use fanorona_core::{Board, CellState, Outcome};
use fanorona_mcts::SearchError;

use crate::players::Player;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    Won(CellState),
    /// No winner within the move cap (or both sides vanished, which legal
    /// play cannot produce).
    Draw,
}

pub struct Game {
    board: Board,
    move_cap: u32,
    show_board: bool,
}

impl Game {
    pub fn new(board: Board, move_cap: u32, show_board: bool) -> Self {
        Self {
            board,
            move_cap,
            show_board,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Play until one side wins, a side is surrounded, or the move cap is
    /// reached. The board yields the turn by itself, so a capture chain
    /// keeps asking the same player.
    pub fn run(
        &mut self,
        x_player: &mut dyn Player,
        o_player: &mut dyn Player,
    ) -> Result<GameEnd> {
        let mut moves_played = 0u32;

        loop {
            if let Some(outcome) = self.board.outcome() {
                return Ok(finish(outcome));
            }
            if moves_played >= self.move_cap {
                info!(moves_played, "move cap reached, adjudicating a draw");
                return Ok(GameEnd::Draw);
            }

            let side = self.board.side_to_move();
            if self.board.legal_moves().is_empty() {
                // Surrounded: the side to move cannot act and loses.
                info!(%side, "side to move is surrounded");
                return Ok(GameEnd::Won(side.opponent()));
            }

            if self.show_board {
                println!("{}", self.board);
                println!("Player {} to move", side);
            }

            let player: &mut dyn Player = match side {
                CellState::X => &mut *x_player,
                _ => &mut *o_player,
            };

            let decision = match player.choose_action(&self.board) {
                Ok(decision) => decision,
                Err(e) => match e.downcast_ref::<SearchError>() {
                    Some(SearchError::DecisionBudgetExhausted) => {
                        warn!(%side, "decision budget exhausted, forfeiting");
                        return Ok(GameEnd::Won(side.opponent()));
                    }
                    _ => return Err(e),
                },
            };

            info!(%side, player = player.name(), action = %decision.action, "move");
            self.board.apply(decision.action);
            moves_played += 1;
        }
    }
}

fn finish(outcome: Outcome) -> GameEnd {
    match outcome {
        Outcome::Win(side) => GameEnd::Won(side),
        Outcome::Draw => GameEnd::Draw,
    }
}
