// Shared helpers for integration tests
//
// `TreeGame` is an explicit game tree: every node carries a static value and
// the children reachable by the agent to move. Agents take turns by depth, so
// a node at depth d belongs to agent d % num_agents.

#![allow(dead_code)]

use multiagent_search::game::GameState;
use multiagent_search::types::{Coord, Grid};
use rand::Rng;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug)]
pub struct Node {
    pub value: f64,
    pub children: Vec<Rc<Node>>,
}

/// Leaf with the given value
pub fn leaf(value: f64) -> Rc<Node> {
    Rc::new(Node {
        value,
        children: vec![],
    })
}

/// Interior node; its own value is only read if the search cuts off here
pub fn node(children: Vec<Rc<Node>>) -> Rc<Node> {
    Rc::new(Node {
        value: 0.0,
        children,
    })
}

/// Interior node whose children are all leaves
pub fn leaves(values: &[f64]) -> Rc<Node> {
    node(values.iter().map(|&v| leaf(v)).collect())
}

/// Random tree of the given height with 1..=max_branching children per node
/// and small integer values (ties are common on purpose)
pub fn random_tree<R: Rng>(rng: &mut R, height: usize, max_branching: usize) -> Rc<Node> {
    let value = f64::from(rng.random_range(-10i32..=10));
    if height == 0 || rng.random_bool(0.1) {
        return leaf(value);
    }
    let branching = rng.random_range(1..=max_branching);
    let children = (0..branching)
        .map(|_| random_tree(rng, height - 1, max_branching))
        .collect();
    Rc::new(Node { value, children })
}

#[derive(Clone, Debug)]
pub struct TreeGame {
    node: Rc<Node>,
    num_agents: usize,
    goals: Grid,
}

impl TreeGame {
    pub fn new(root: Rc<Node>, num_agents: usize) -> Self {
        TreeGame {
            node: root,
            num_agents,
            goals: Grid::new(0, 0),
        }
    }

    pub fn value(&self) -> f64 {
        self.node.value
    }
}

impl GameState for TreeGame {
    type Action = usize;

    fn legal_actions(&self, _agent: usize) -> Vec<usize> {
        (0..self.node.children.len()).collect()
    }

    fn successor(&self, _agent: usize, action: usize) -> Self {
        TreeGame {
            node: self.node.children[action].clone(),
            num_agents: self.num_agents,
            goals: self.goals.clone(),
        }
    }

    fn num_agents(&self) -> usize {
        self.num_agents
    }

    fn maximizer_position(&self) -> Coord {
        Coord::new(0, 0)
    }

    fn adversary_positions(&self) -> Vec<Coord> {
        vec![]
    }

    fn remaining_goals(&self) -> &Grid {
        &self.goals
    }

    fn score(&self) -> f64 {
        self.node.value
    }
}

/// Static evaluator reading the node value
pub fn node_value(state: &TreeGame) -> f64 {
    state.value()
}

/// Helper function to get the path to test fixtures
pub fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}
