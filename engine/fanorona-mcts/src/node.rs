//! Tree nodes shared by the UCT and PUCT agents.

use fanorona_core::{CellState, Move};

/// Index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// One node of the search tree.
///
/// `value_sum` is overloaded by agent: the UCT agent accumulates rollout
/// wins (one per winning playout), the PUCT agent accumulates signed
/// values in `[-1, 1]` from the perspective of the node's player. The
/// prior, cached network value and `expanded` flag are only meaningful to
/// the PUCT agent.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    /// The action that produced this node; `None` at the root.
    pub action: Option<Move>,
    pub player: CellState,
    pub visit_count: u32,
    pub value_sum: f64,
    pub prior: f32,
    pub network_value: f32,
    pub expanded: bool,
    /// Cached result for terminal nodes, set the first time the search
    /// reaches the end of the game through this node.
    pub terminal_value: Option<f32>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new_root(player: CellState) -> Node {
        Node {
            parent: NodeId::NONE,
            action: None,
            player,
            visit_count: 0,
            value_sum: 0.0,
            prior: 1.0,
            network_value: 0.0,
            expanded: false,
            terminal_value: None,
            children: Vec::new(),
        }
    }

    pub fn new_child(parent: NodeId, player: CellState, action: Move, prior: f32) -> Node {
        Node {
            parent,
            action: Some(action),
            player,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            network_value: 0.0,
            expanded: false,
            terminal_value: None,
            children: Vec::new(),
        }
    }

    /// Mean accumulated value; zero while unvisited.
    #[inline]
    pub fn q_value(&self) -> f64 {
        self.value_sum / self.visit_count.max(1) as f64
    }

    /// Win ratio for the UCT agent. `None` while unvisited, so callers
    /// cannot divide by zero.
    #[inline]
    pub fn win_ratio(&self) -> Option<f64> {
        if self.visit_count == 0 {
            None
        } else {
            Some(self.value_sum / self.visit_count as f64)
        }
    }

    /// UCT score against a parent's visit count. Unvisited children score
    /// infinity so every child is tried once.
    pub fn uct_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        match self.win_ratio() {
            None => f64::INFINITY,
            Some(ratio) => {
                let exploration_term =
                    exploration * ((parent_visits as f64).ln() / self.visit_count as f64).sqrt();
                ratio + exploration_term
            }
        }
    }

    /// PUCT score as seen from `parent_player`:
    /// `Q + c * P * sqrt(N_parent) / (1 + N)`.
    ///
    /// `value_sum` is accumulated from this node's own player perspective,
    /// so the exploitation term is negated whenever the turn changed on
    /// the edge from the parent — the same condition backpropagation flips
    /// on. Without the flip a parent would read a turn-passing child's
    /// value from the opponent's point of view and rank its own good
    /// lines as bad.
    pub fn puct_score(&self, parent_player: CellState, parent_visits_sqrt: f64, c_puct: f32) -> f64 {
        let q = if self.player == parent_player {
            self.q_value()
        } else {
            -self.q_value()
        };
        q + c_puct as f64 * self.prior as f64 * parent_visits_sqrt
            / (1.0 + self.visit_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanorona_core::{CaptureKind, Direction};

    fn any_move() -> Move {
        Move::new(2, 2, Direction::Right, CaptureKind::Paika)
    }

    #[test]
    fn node_id_sentinel() {
        assert!(NodeId::NONE.is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn unvisited_children_score_infinity() {
        let node = Node::new_child(NodeId(0), CellState::X, any_move(), 0.5);
        assert_eq!(node.uct_score(10, 1.41), f64::INFINITY);
        assert_eq!(node.win_ratio(), None);
    }

    #[test]
    fn uct_score_combines_exploitation_and_exploration() {
        let mut node = Node::new_child(NodeId(0), CellState::X, any_move(), 0.5);
        node.visit_count = 10;
        node.value_sum = 7.0;

        let score = node.uct_score(100, 1.41);
        let expected = 0.7 + 1.41 * (100f64.ln() / 10.0).sqrt();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn puct_score_weights_prior_for_unvisited() {
        let mut a = Node::new_child(NodeId(0), CellState::X, any_move(), 0.1);
        let b = Node::new_child(NodeId(0), CellState::X, any_move(), 0.8);
        // Unvisited nodes are ranked purely by prior.
        assert!(
            b.puct_score(CellState::X, 5.0, 1.25) > a.puct_score(CellState::X, 5.0, 1.25)
        );

        // Accumulated value shifts the balance.
        a.visit_count = 2;
        a.value_sum = 1.8;
        assert!(a.q_value() > 0.0);
    }

    #[test]
    fn puct_score_flips_q_across_turn_changes() {
        // A turn-passing child stores value from the opponent's
        // perspective; the parent must read it negated.
        let mut child = Node::new_child(NodeId(0), CellState::O, any_move(), 0.5);
        child.visit_count = 4;
        child.value_sum = -2.0; // losing for O, i.e. good for X

        // Zero exploration terms leave the pure Q reading.
        let seen_by_x = child.puct_score(CellState::X, 0.0, 0.0);
        let seen_by_o = child.puct_score(CellState::O, 0.0, 0.0);
        assert!((seen_by_x - 0.5).abs() < 1e-9);
        assert!((seen_by_o + 0.5).abs() < 1e-9);
    }
}
