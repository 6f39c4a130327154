// Depth-limited game-tree search: minimax, alpha-beta and expectimax
//
// One recursive walker serves all three strategies. Every agent move is one
// ply; a search of depth D explores D full rounds (D * num_agents plies)
// before the evaluator is consulted. Agent 0 is always a Max node; adversary
// nodes are Min nodes, or Chance nodes under expectimax.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::AgentError;
use crate::evaluation::Evaluator;
use crate::game::{next_agent, GameState, MAXIMIZER};

/// Check the clock once every this many nodes
const TIME_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Adversaries minimize the maximizer's value
    Minimax,
    /// Minimax with alpha-beta pruning; same decisions, fewer nodes
    AlphaBeta,
    /// Adversaries pick uniformly at random among their legal moves
    Expectimax,
}

impl Strategy {
    pub fn node_kind(&self, agent: usize) -> NodeKind {
        match (self, agent) {
            (_, MAXIMIZER) => NodeKind::Max,
            (Strategy::Expectimax, _) => NodeKind::Chance,
            _ => NodeKind::Min,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Minimax => "minimax",
            Strategy::AlphaBeta => "alpha_beta",
            Strategy::Expectimax => "expectimax",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Max,
    Min,
    Chance,
}

/// Optional node and wall-clock budgets. Unlimited by default.
///
/// Once a budget runs out every node still to be visited is evaluated in
/// place instead of expanded, so a move is always produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_nodes: Option<u64>,
    pub move_time: Option<Duration>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        SearchLimits::default()
    }

    pub fn nodes(max_nodes: u64) -> Self {
        SearchLimits {
            max_nodes: Some(max_nodes),
            move_time: None,
        }
    }

    pub fn move_time(millis: u64) -> Self {
        SearchLimits {
            max_nodes: None,
            move_time: Some(Duration::from_millis(millis)),
        }
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// States visited, root included
    pub nodes: u64,
    /// Evaluator calls
    pub evaluations: u64,
    /// Sibling loops abandoned by alpha-beta
    pub cutoffs: u64,
    /// Deepest ply reached
    pub max_ply: usize,
}

/// Value of a subtree. `action` is only meaningful where a move was chosen;
/// leaves carry `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult<A> {
    pub score: f64,
    pub action: Option<A>,
}

impl<A> SearchResult<A> {
    fn leaf(score: f64) -> Self {
        SearchResult {
            score,
            action: None,
        }
    }
}

/// What a top-level search hands back to its caller
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<A> {
    pub action: A,
    pub score: f64,
    pub stats: SearchStats,
    /// A budget in `SearchLimits` ran out before the tree was complete
    pub stopped: bool,
}

/// True when `state` must be evaluated rather than expanded: either `depth`
/// full rounds have been played (`plies` counts agent moves since the root)
/// or `agent` has no legal move.
pub fn is_cutoff<S: GameState>(state: &S, agent: usize, plies: usize, depth: u32) -> bool {
    plies >= depth as usize * state.num_agents() || state.legal_actions(agent).is_empty()
}

/// Runs `strategy` from `state` with the maximizer to move and returns the
/// chosen root action.
///
/// Ties between root actions go to the first one in `legal_actions` order.
/// `rng` is only drawn from at expectimax chance nodes.
pub fn search<S, E, R>(
    state: &S,
    strategy: Strategy,
    depth: u32,
    evaluator: &E,
    rng: &mut R,
    limits: &SearchLimits,
) -> Result<SearchOutcome<S::Action>, AgentError>
where
    S: GameState,
    E: Evaluator<S>,
    R: Rng,
{
    if depth == 0 {
        return Err(AgentError::InvalidDepth(depth));
    }
    assert!(state.num_agents() > 0, "game reports zero agents");

    if state.legal_actions(MAXIMIZER).is_empty() {
        return Err(AgentError::NoLegalActions);
    }

    let mut ctx = SearchContext {
        strategy,
        depth,
        evaluator,
        rng,
        limits,
        start: Instant::now(),
        stats: SearchStats::default(),
        stopped: false,
    };

    ctx.stats.nodes = 1;
    let root = ctx.expand(state, MAXIMIZER, 0, f64::NEG_INFINITY, f64::INFINITY);
    let action = root.action.ok_or(AgentError::NoLegalActions)?;

    debug!(
        "{} depth {}: score {:.3}, {} nodes, {} evaluations, {} cutoffs, {}ms",
        strategy.as_str(),
        depth,
        root.score,
        ctx.stats.nodes,
        ctx.stats.evaluations,
        ctx.stats.cutoffs,
        ctx.start.elapsed().as_millis()
    );

    Ok(SearchOutcome {
        action,
        score: root.score,
        stats: ctx.stats,
        stopped: ctx.stopped,
    })
}

struct SearchContext<'a, E, R> {
    strategy: Strategy,
    depth: u32,
    evaluator: &'a E,
    rng: &'a mut R,
    limits: &'a SearchLimits,
    start: Instant,
    stats: SearchStats,
    stopped: bool,
}

impl<'a, E, R: Rng> SearchContext<'a, E, R> {
    fn budget_exhausted(&mut self) -> bool {
        if self.stopped {
            return true;
        }

        if let Some(max_nodes) = self.limits.max_nodes {
            if self.stats.nodes >= max_nodes {
                self.stopped = true;
                return true;
            }
        }

        if self.stats.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(move_time) = self.limits.move_time {
                if self.start.elapsed() >= move_time {
                    self.stopped = true;
                    return true;
                }
            }
        }

        false
    }

    /// Visits a state reached after `plies` agent moves with `agent` to move
    fn value<S>(
        &mut self,
        state: &S,
        agent: usize,
        plies: usize,
        alpha: f64,
        beta: f64,
    ) -> SearchResult<S::Action>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        self.stats.nodes += 1;
        self.stats.max_ply = self.stats.max_ply.max(plies);

        if self.budget_exhausted() || is_cutoff(state, agent, plies, self.depth) {
            self.stats.evaluations += 1;
            return SearchResult::leaf(self.evaluator.evaluate(state));
        }

        self.expand(state, agent, plies, alpha, beta)
    }

    fn expand<S>(
        &mut self,
        state: &S,
        agent: usize,
        plies: usize,
        alpha: f64,
        beta: f64,
    ) -> SearchResult<S::Action>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        match self.strategy.node_kind(agent) {
            NodeKind::Max => self.max_value(state, agent, plies, alpha, beta),
            NodeKind::Min => self.min_value(state, agent, plies, alpha, beta),
            NodeKind::Chance => self.chance_value(state, agent, plies),
        }
    }

    fn max_value<S>(
        &mut self,
        state: &S,
        agent: usize,
        plies: usize,
        mut alpha: f64,
        beta: f64,
    ) -> SearchResult<S::Action>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let next = next_agent(agent, state.num_agents());
        let mut best: Option<(f64, S::Action)> = None;

        for action in state.legal_actions(agent) {
            let child = state.successor(agent, action);
            let score = self.value(&child, next, plies + 1, alpha, beta).score;

            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, action));
            }

            if self.strategy == Strategy::AlphaBeta {
                let best_score = best.map_or(f64::NEG_INFINITY, |(s, _)| s);
                if best_score > beta {
                    self.stats.cutoffs += 1;
                    break;
                }
                alpha = alpha.max(best_score);
            }
        }

        SearchResult {
            score: best.map_or(f64::NEG_INFINITY, |(s, _)| s),
            action: best.map(|(_, a)| a),
        }
    }

    fn min_value<S>(
        &mut self,
        state: &S,
        agent: usize,
        plies: usize,
        alpha: f64,
        mut beta: f64,
    ) -> SearchResult<S::Action>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let next = next_agent(agent, state.num_agents());
        let mut best: Option<(f64, S::Action)> = None;

        for action in state.legal_actions(agent) {
            let child = state.successor(agent, action);
            let score = self.value(&child, next, plies + 1, alpha, beta).score;

            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, action));
            }

            if self.strategy == Strategy::AlphaBeta {
                let best_score = best.map_or(f64::INFINITY, |(s, _)| s);
                if best_score < alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
                beta = beta.min(best_score);
            }
        }

        SearchResult {
            score: best.map_or(f64::INFINITY, |(s, _)| s),
            action: best.map(|(_, a)| a),
        }
    }

    /// Uniform expectation over the adversary's moves. The reported action is
    /// a uniform draw and says nothing about which child scored what.
    fn chance_value<S>(&mut self, state: &S, agent: usize, plies: usize) -> SearchResult<S::Action>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let next = next_agent(agent, state.num_agents());
        let actions = state.legal_actions(agent);
        if actions.is_empty() {
            self.stats.evaluations += 1;
            return SearchResult::leaf(self.evaluator.evaluate(state));
        }

        let mut total = 0.0;
        for &action in &actions {
            let child = state.successor(agent, action);
            total += self
                .value(&child, next, plies + 1, f64::NEG_INFINITY, f64::INFINITY)
                .score;
        }

        SearchResult {
            score: total / actions.len() as f64,
            action: Some(actions[self.rng.random_range(0..actions.len())]),
        }
    }
}
