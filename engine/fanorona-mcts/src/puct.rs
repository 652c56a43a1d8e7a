//! The iteration-budgeted PUCT agent.
//!
//! AlphaZero-style search: the evaluator supplies a prior over the shared
//! action space and a scalar value; selection walks the whole tree with the
//! PUCT formula on a working board copy; values propagate back up with a
//! sign flip wherever the turn changed. The most-visited root child is
//! played and the root visit distribution is exposed for data collection.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Gamma};
use tracing::debug;

use fanorona_core::{Board, CellState, EncodedPosition, Move, Outcome, ACTION_SPACE};

use crate::config::{ConfigError, PuctConfig};
use crate::error::SearchError;
use crate::evaluator::{masked_softmax, Evaluator, EvaluatorError};
use crate::node::{Node, NodeId};
use crate::tree::Tree;

/// Outcome of one PUCT decision.
#[derive(Debug, Clone)]
pub struct PuctResult {
    /// The most-visited root move.
    pub action: Move,
    /// Root visit distribution over the flat action space: each explored
    /// move holds `visits(child) / visits(root)`, everything else zero.
    pub visit_policy: Vec<f32>,
    /// Mean value accumulated at the root.
    pub root_value: f32,
}

pub struct PuctAgent<E: Evaluator> {
    config: PuctConfig,
    evaluator: E,
    rng: ChaCha20Rng,
}

impl<E: Evaluator> PuctAgent<E> {
    pub fn new(config: PuctConfig, evaluator: E) -> Result<PuctAgent<E>, ConfigError> {
        config.validate()?;
        Ok(PuctAgent {
            config,
            evaluator,
            rng: ChaCha20Rng::from_entropy(),
        })
    }

    /// Deterministic construction for tests and reproducible matches.
    pub fn with_seed(config: PuctConfig, evaluator: E, seed: u64) -> Result<PuctAgent<E>, ConfigError> {
        config.validate()?;
        Ok(PuctAgent {
            config,
            evaluator,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Run the configured number of simulations from `board` and return
    /// the chosen move plus the root visit policy. The caller's board is
    /// not touched.
    pub fn choose_action(&mut self, board: &Board) -> Result<PuctResult, SearchError> {
        if board.outcome().is_some() {
            return Err(SearchError::TerminalPosition);
        }

        let root_player = board.side_to_move();
        let mut tree = Tree::new(root_player);
        let root = tree.root();

        self.expand(&mut tree, root, board, root_player)?;
        if tree.get(root).children.is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        if self.config.dirichlet_alpha > 0.0 {
            self.add_dirichlet_noise(&mut tree);
        }

        for _ in 0..self.config.num_simulations {
            self.simulate(&mut tree, board, root_player)?;
        }

        let (action, visits) = self.most_visited(&tree, root)?;
        let root_node = tree.get(root);
        let root_visits = root_node.visit_count.max(1);

        let mut visit_policy = vec![0.0f32; ACTION_SPACE];
        for &child in &root_node.children {
            let child_node = tree.get(child);
            if let Some(mv) = child_node.action {
                visit_policy[mv.flat_index()] =
                    child_node.visit_count as f32 / root_visits as f32;
            }
        }

        debug!(
            action = %action,
            visits,
            root_visits = root_node.visit_count,
            root_value = root_node.q_value(),
            nodes = tree.len(),
            "PUCT decision"
        );

        Ok(PuctResult {
            action,
            visit_policy,
            root_value: root_node.q_value() as f32,
        })
    }

    /// One iteration: select down to a leaf on a working board, score the
    /// leaf (terminal result or evaluator), backpropagate.
    fn simulate(
        &mut self,
        tree: &mut Tree,
        root_board: &Board,
        root_player: CellState,
    ) -> Result<(), SearchError> {
        let mut board = root_board.clone();
        let mut current = tree.root();

        loop {
            let node = tree.get(current);
            if node.terminal_value.is_some() || !node.expanded {
                break;
            }
            match tree.select_child_puct(current, self.config.c_puct) {
                Some(child) => {
                    if let Some(mv) = tree.get(child).action {
                        board.apply(mv);
                    }
                    current = child;
                }
                None => break,
            }
        }

        let value = if let Some(v) = tree.get(current).terminal_value {
            v
        } else if let Some(outcome) = board.outcome() {
            let v = terminal_score(outcome, root_player);
            tree.get_mut(current).terminal_value = Some(v);
            v
        } else {
            self.expand(tree, current, &board, root_player)?
        };

        tree.backpropagate_value(current, value);
        Ok(())
    }

    /// Evaluate a leaf and attach one child per legal move, with priors
    /// from the masked softmax of the policy logits. A leaf whose side to
    /// move is surrounded becomes a terminal loss for that side instead.
    /// Returns the value to backpropagate.
    fn expand(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        board: &Board,
        root_player: CellState,
    ) -> Result<f32, SearchError> {
        let moves = board.legal_moves();
        if moves.is_empty() {
            let winner = board.side_to_move().opponent();
            let v = if winner == root_player { 1.0 } else { -1.0 };
            tree.get_mut(id).terminal_value = Some(v);
            return Ok(v);
        }

        let encoded = EncodedPosition::from_board(board);
        let eval = self
            .evaluator
            .evaluate(&encoded.planes, &encoded.legal_mask)?;
        if eval.policy_logits.len() != ACTION_SPACE {
            return Err(EvaluatorError::BadPolicyShape {
                got: eval.policy_logits.len(),
                expected: ACTION_SPACE,
            }
            .into());
        }
        let priors = masked_softmax(&eval.policy_logits, &encoded.legal_mask);

        let node_player = tree.get(id).player;
        for mv in moves {
            // The turn only passes on non-capturing moves, so a capture's
            // child belongs to the same player.
            let child_player = if mv.capture.is_capture() {
                node_player
            } else {
                node_player.opponent()
            };
            let prior = priors[mv.flat_index()];
            tree.add_child(Node::new_child(id, child_player, mv, prior));
        }

        let node = tree.get_mut(id);
        node.expanded = true;
        node.network_value = eval.value;
        Ok(eval.value)
    }

    /// Mix Dirichlet noise into the root priors, for self-play variety.
    fn add_dirichlet_noise(&mut self, tree: &mut Tree) {
        let root = tree.root();
        let children: Vec<NodeId> = tree.get(root).children.clone();
        if children.is_empty() {
            return;
        }
        let gamma = match Gamma::new(self.config.dirichlet_alpha as f64, 1.0) {
            Ok(gamma) => gamma,
            Err(_) => return,
        };

        let mut noise: Vec<f64> = (0..children.len())
            .map(|_| gamma.sample(&mut self.rng))
            .collect();
        let total: f64 = noise.iter().sum();
        if total <= 0.0 {
            return;
        }
        for n in &mut noise {
            *n /= total;
        }

        let eps = self.config.dirichlet_epsilon;
        for (child, n) in children.into_iter().zip(noise) {
            let node = tree.get_mut(child);
            node.prior = (1.0 - eps) * node.prior + eps * n as f32;
        }
    }

    /// The most-visited root child; equal visit counts resolve to the
    /// lowest flat action index.
    fn most_visited(&self, tree: &Tree, root: NodeId) -> Result<(Move, u32), SearchError> {
        let mut best: Option<(Move, u32, usize)> = None;
        for &child in &tree.get(root).children {
            let node = tree.get(child);
            let mv = match node.action {
                Some(mv) => mv,
                None => continue,
            };
            let flat = mv.flat_index();
            let better = match best {
                None => true,
                Some((_, visits, index)) => {
                    node.visit_count > visits || (node.visit_count == visits && flat < index)
                }
            };
            if better {
                best = Some((mv, node.visit_count, flat));
            }
        }
        best.map(|(mv, visits, _)| (mv, visits))
            .ok_or(SearchError::NoLegalActions)
    }
}

/// Terminal result seen from the root player.
fn terminal_score(outcome: Outcome, root_player: CellState) -> f32 {
    match outcome {
        Outcome::Win(side) if side == root_player => 1.0,
        Outcome::Win(_) => -1.0,
        Outcome::Draw => 0.0,
    }
}
