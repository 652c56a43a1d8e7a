//! The players: human, UCT agent, PUCT agent.
//!
//! All three share one contract: given the current board, produce the move
//! to play plus an optional visit policy for data collection. Only the
//! PUCT agent produces a policy; the others return the empty sentinel.

use std::io::{self, BufRead, BufReader, Read, Write};

use anyhow::{bail, Context, Result};
use tracing::debug;

use fanorona_core::{Board, Move};
use fanorona_mcts::{Evaluator, PuctAgent, UctAgent};

/// A chosen action plus the root visit policy over the flat action space.
/// An empty policy means the player does not produce one.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Move,
    pub visit_policy: Vec<f32>,
}

impl Decision {
    fn action_only(action: Move) -> Decision {
        Decision {
            action,
            visit_policy: Vec::new(),
        }
    }
}

/// Anything that can take a turn.
pub trait Player {
    fn name(&self) -> &str;

    /// Choose a move for the board's side to move. Must not mutate the
    /// board; the game loop applies the returned action itself.
    fn choose_action(&mut self, board: &Board) -> Result<Decision>;
}

/// Console-driven player: enumerates the legal moves and reads a 1-based
/// selection, re-prompting until the input is valid.
pub struct HumanPlayer<R, W> {
    input: R,
    output: W,
}

/// Stdin reader that takes the lock per call, so the menu and any number
/// of human players can share the console without deadlocking.
pub struct ConsoleIn;

impl Read for ConsoleIn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::stdin().lock().read(buf)
    }
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl HumanPlayer<BufReader<ConsoleIn>, io::Stdout> {
    /// A human player wired to the process console.
    pub fn console() -> Self {
        Self::new(BufReader::new(ConsoleIn), io::stdout())
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    fn name(&self) -> &str {
        "human"
    }

    fn choose_action(&mut self, board: &Board) -> Result<Decision> {
        let moves = board.legal_moves();
        if moves.is_empty() {
            bail!("no legal moves for the human player");
        }

        for (i, mv) in moves.iter().enumerate() {
            writeln!(self.output, "{} - {}", i + 1, mv)?;
        }

        loop {
            write!(self.output, "Choose one move among the given above: ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("reading move selection")?;
            if read == 0 {
                bail!("input closed while waiting for a move selection");
            }

            match line.trim().parse::<usize>() {
                Ok(choice) if (1..=moves.len()).contains(&choice) => {
                    return Ok(Decision::action_only(moves[choice - 1]));
                }
                Ok(_) => writeln!(self.output, "Invalid choice! Try again.")?,
                Err(_) => writeln!(self.output, "Invalid input! Try again.")?,
            }
        }
    }
}

/// Rollout-MCTS player, bounded by wall-clock time.
pub struct UctPlayer {
    agent: UctAgent,
}

impl UctPlayer {
    pub fn new(agent: UctAgent) -> Self {
        Self { agent }
    }
}

impl Player for UctPlayer {
    fn name(&self) -> &str {
        "uct"
    }

    fn choose_action(&mut self, board: &Board) -> Result<Decision> {
        let action = self.agent.choose_action(board)?;
        Ok(Decision::action_only(action))
    }
}

/// Evaluator-guided MCTS player, bounded by an iteration count. Returns
/// the root visit policy alongside the move.
pub struct PuctPlayer<E: Evaluator> {
    agent: PuctAgent<E>,
}

impl<E: Evaluator> PuctPlayer<E> {
    pub fn new(agent: PuctAgent<E>) -> Self {
        Self { agent }
    }
}

impl<E: Evaluator> Player for PuctPlayer<E> {
    fn name(&self) -> &str {
        "puct"
    }

    fn choose_action(&mut self, board: &Board) -> Result<Decision> {
        let result = self.agent.choose_action(board)?;
        debug!(value = result.root_value, "puct root value");
        Ok(Decision {
            action: result.action,
            visit_policy: result.visit_policy,
        })
    }
}
