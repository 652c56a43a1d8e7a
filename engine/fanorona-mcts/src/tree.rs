//! Arena-backed search tree.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by index, so
//! the parent/child graph has no reference cycles and dropping the tree
//! releases everything at once.

use fanorona_core::CellState;

use crate::node::{Node, NodeId};

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only a root for the given side to move.
    pub fn new(root_player: CellState) -> Tree {
        Tree {
            nodes: vec![Node::new_root(root_player)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach `node` under its parent and return its id.
    pub fn add_child(&mut self, node: Node) -> NodeId {
        let parent = node.parent;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Pick the child of `parent` with the highest UCT score. Ties keep
    /// the earliest child, i.e. move-generation order.
    pub fn select_child_uct(&self, parent: NodeId, exploration: f64) -> Option<NodeId> {
        let parent_node = self.get(parent);
        let parent_visits = parent_node.visit_count;

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &parent_node.children {
            let score = self.get(child_id).uct_score(parent_visits, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Pick the child of `parent` with the highest PUCT score, reading
    /// each child's value from the parent's perspective. Ties keep the
    /// earliest child.
    pub fn select_child_puct(&self, parent: NodeId, c_puct: f32) -> Option<NodeId> {
        let parent_node = self.get(parent);
        let parent_player = parent_node.player;
        let parent_visits_sqrt = (parent_node.visit_count as f64).sqrt();

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &parent_node.children {
            let score = self
                .get(child_id)
                .puct_score(parent_player, parent_visits_sqrt, c_puct);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// UCT backpropagation: every node on the path to the root gets a
    /// visit, and a win whenever the playout winner is its own player.
    pub fn backpropagate_wins(&mut self, from: NodeId, winner: Option<CellState>) {
        let mut current = from;
        while current.is_some() {
            let node = self.get_mut(current);
            node.visit_count += 1;
            if winner == Some(node.player) {
                node.value_sum += 1.0;
            }
            current = node.parent;
        }
    }

    /// PUCT backpropagation: add `value` along the path to the root,
    /// flipping its sign across every edge where the turn changed.
    pub fn backpropagate_value(&mut self, from: NodeId, value: f32) {
        let mut current = from;
        let mut v = value as f64;

        let node = self.get_mut(current);
        node.visit_count += 1;
        node.value_sum += v;

        while self.get(current).parent.is_some() {
            let parent = self.get(current).parent;
            if self.get(parent).player != self.get(current).player {
                v = -v;
            }
            let parent_node = self.get_mut(parent);
            parent_node.visit_count += 1;
            parent_node.value_sum += v;
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanorona_core::{CaptureKind, Direction, Move};

    fn mv(x: u8, y: u8) -> Move {
        Move::new(x, y, Direction::Right, CaptureKind::Paika)
    }

    #[test]
    fn add_child_links_both_ways() {
        let mut tree = Tree::new(CellState::X);
        let child = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 0), 0.5));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(tree.root()).children, vec![child]);
        assert_eq!(tree.get(child).parent, tree.root());
    }

    #[test]
    fn win_backprop_counts_only_matching_players() {
        let mut tree = Tree::new(CellState::X);
        let child = tree.add_child(Node::new_child(tree.root(), CellState::X, mv(0, 0), 1.0));

        tree.backpropagate_wins(child, Some(CellState::X));
        tree.backpropagate_wins(child, Some(CellState::O));
        tree.backpropagate_wins(child, None);

        let node = tree.get(child);
        assert_eq!(node.visit_count, 3);
        assert_eq!(node.value_sum, 1.0);
        let root = tree.get(tree.root());
        assert_eq!(root.visit_count, 3);
        assert_eq!(root.value_sum, 1.0);
    }

    #[test]
    fn value_backprop_negates_across_turn_changes() {
        // root (X to move) -> capture child (still X) -> paika child (O).
        let mut tree = Tree::new(CellState::X);
        let chain = tree.add_child(Node::new_child(tree.root(), CellState::X, mv(0, 0), 1.0));
        let passed = tree.add_child(Node::new_child(chain, CellState::O, mv(1, 0), 1.0));

        tree.backpropagate_value(passed, 1.0);

        // Same player on the chain edge: no sign flip. Turn change on the
        // root edge: flipped once.
        assert_eq!(tree.get(passed).value_sum, 1.0);
        assert_eq!(tree.get(chain).value_sum, -1.0);
        assert_eq!(tree.get(tree.root()).value_sum, -1.0);
        assert_eq!(tree.get(tree.root()).visit_count, 1);
    }

    #[test]
    fn value_backprop_keeps_q_in_range() {
        let mut tree = Tree::new(CellState::X);
        let child = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 0), 1.0));

        for i in 0..50 {
            let v = if i % 3 == 0 { 1.0 } else { -1.0 };
            tree.backpropagate_value(child, v);
        }
        for id in [tree.root(), child] {
            let q = tree.get(id).q_value();
            assert!((-1.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn selection_breaks_ties_by_insertion_order() {
        let mut tree = Tree::new(CellState::X);
        let first = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 0), 0.5));
        let _second = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 1), 0.5));

        // Equal priors, both unvisited: the earliest child wins.
        assert_eq!(tree.select_child_puct(tree.root(), 1.25), Some(first));
        assert_eq!(tree.select_child_uct(tree.root(), 1.41), Some(first));
    }

    #[test]
    fn puct_selection_prefers_higher_prior() {
        let mut tree = Tree::new(CellState::X);
        tree.get_mut(NodeId(0)).visit_count = 1;
        let _low = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 0), 0.2));
        let high = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 1), 0.8));

        assert_eq!(tree.select_child_puct(tree.root(), 1.25), Some(high));
    }

    #[test]
    fn puct_selection_reads_child_values_from_the_parent_side() {
        // Two turn-passing children with opposite values. Their sums are
        // stored from O's perspective, so X must chase the one that is
        // losing for O.
        let mut tree = Tree::new(CellState::X);
        tree.get_mut(NodeId(0)).visit_count = 8;
        let good = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 0), 0.5));
        let bad = tree.add_child(Node::new_child(tree.root(), CellState::O, mv(0, 1), 0.5));

        tree.get_mut(good).visit_count = 4;
        tree.get_mut(good).value_sum = -3.2;
        tree.get_mut(bad).visit_count = 4;
        tree.get_mut(bad).value_sum = 3.2;

        // Priors and visits are equal, so the flipped Q decides.
        assert_eq!(tree.select_child_puct(tree.root(), 1.25), Some(good));
    }
}
