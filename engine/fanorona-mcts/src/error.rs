//! Errors shared by the search agents.

use thiserror::Error;

use crate::evaluator::EvaluatorError;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The side to move is surrounded. The game loop treats this as a
    /// loss, not a failure.
    #[error("no legal actions for the side to move")]
    NoLegalActions,

    /// The time budget ran out before a single playout finished, so no
    /// child has statistics to choose from.
    #[error("decision budget exhausted before any playout completed")]
    DecisionBudgetExhausted,

    /// The agent was asked to act in a game that is already decided.
    #[error("cannot search a finished game")]
    TerminalPosition,

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
}
