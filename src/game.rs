// The narrow interface the search engine consumes from a game implementation
//
// States are immutable values: `successor` always returns a fresh snapshot and
// never touches `self`, so the search can hold any number of them at once.

use std::fmt::Debug;

use crate::types::{Coord, Grid};

/// Index of the maximizing agent; every other index is an adversary
pub const MAXIMIZER: usize = 0;

/// Snapshot of a turn-alternating multi-agent game at one ply
pub trait GameState: Clone {
    /// Opaque move token, compared by equality
    type Action: Copy + Eq + Debug;

    /// Legal actions for `agent`, in a stable order
    fn legal_actions(&self, agent: usize) -> Vec<Self::Action>;

    /// The state after `agent` plays `action`
    fn successor(&self, agent: usize, action: Self::Action) -> Self;

    fn num_agents(&self) -> usize;

    fn maximizer_position(&self) -> Coord;

    fn adversary_positions(&self) -> Vec<Coord>;

    /// Cells still holding a collectible goal
    fn remaining_goals(&self) -> &Grid;

    fn score(&self) -> f64;

    /// True when the maximizer has nothing left to play (win, loss or stuck)
    fn is_terminal(&self) -> bool {
        self.legal_actions(MAXIMIZER).is_empty()
    }
}

/// Agent that moves after `agent`, wrapping back to the maximizer
pub fn next_agent(agent: usize, num_agents: usize) -> usize {
    (agent + 1) % num_agents
}
