//! Monte Carlo Tree Search agents for Fanorona.
//!
//! Two agents share one arena-backed tree representation:
//!
//! 1. **UCT** ([`UctAgent`]): classic rollout MCTS bounded by wall-clock
//!    time. Children of the root are scored with the UCT formula, a random
//!    playout decides the winner, and the best win ratio is played. Needs
//!    no evaluator.
//! 2. **PUCT** ([`PuctAgent`]): AlphaZero-style search bounded by an
//!    iteration count. A pluggable [`Evaluator`] supplies move priors and a
//!    position value; selection descends the whole tree with the PUCT
//!    formula and the most-visited root child is played, together with the
//!    visit-count policy over the shared action space.
//!
//! Both agents draw all randomness from a single seeded `ChaCha20Rng`, so a
//! fixed seed and evaluator make the chosen action reproducible. Neither
//! agent ever mutates the caller's board.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod node;
pub mod puct;
pub mod tree;
pub mod uct;

pub use config::{ConfigError, PuctConfig, UctConfig};
pub use error::SearchError;
pub use evaluator::{Evaluation, Evaluator, EvaluatorError, UniformEvaluator};
pub use node::{Node, NodeId};
pub use puct::{PuctAgent, PuctResult};
pub use tree::Tree;
pub use uct::UctAgent;
