// Agents: construct once, ask for one action per turn
//
// `SearchAgent` wraps a search strategy, an evaluator and a depth limit.
// `ReflexAgent` is the zero-lookahead baseline that scores the maximizer's
// immediate moves and breaks ties at random.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::evaluation::{ActionEvaluator, Evaluation, EvaluationWeights, Evaluator, ReflexEvaluation};
use crate::game::{GameState, MAXIMIZER};
use crate::search::{search, SearchLimits, SearchOutcome, SearchStats, Strategy};

/// Common interface the driver talks to
pub trait Agent<S: GameState> {
    /// Picks the maximizer's move. Fails when the maximizer has no legal action.
    fn choose_action(&mut self, state: &S) -> Result<S::Action, AgentError>;

    fn name(&self) -> &str;

    /// Counters from the most recent `choose_action`, if the agent searches
    fn last_stats(&self) -> Option<SearchStats> {
        None
    }
}

/// Which kind of agent a configuration builds
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Reflex,
    Minimax,
    AlphaBeta,
    Expectimax,
}

impl AgentKind {
    /// Search strategy behind this kind; `None` for the reflex agent
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            AgentKind::Reflex => None,
            AgentKind::Minimax => Some(Strategy::Minimax),
            AgentKind::AlphaBeta => Some(Strategy::AlphaBeta),
            AgentKind::Expectimax => Some(Strategy::Expectimax),
        }
    }
}

/// Construction options for a search agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    pub strategy: Strategy,
    pub evaluation_function: String,
    /// Number of full rounds (every agent moves once per round)
    pub search_depth: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        AgentOptions {
            strategy: Strategy::Minimax,
            evaluation_function: "score".to_string(),
            search_depth: 2,
        }
    }
}

/// Depth-limited adversarial search agent
pub struct SearchAgent<E = Evaluation, R = StdRng> {
    name: String,
    strategy: Strategy,
    depth: u32,
    evaluator: E,
    rng: R,
    limits: SearchLimits,
    last_stats: Option<SearchStats>,
}

impl SearchAgent<Evaluation, StdRng> {
    /// Resolves the evaluation function by name and validates the depth.
    /// Configuration mistakes surface here, not on the first move.
    pub fn new(options: AgentOptions) -> Result<Self, AgentError> {
        Self::with_weights(options, EvaluationWeights::default())
    }

    pub fn with_weights(
        options: AgentOptions,
        weights: EvaluationWeights,
    ) -> Result<Self, AgentError> {
        let evaluation = Evaluation::from_name(&options.evaluation_function, weights)?;
        let mut agent = SearchAgent::with_evaluator(
            options.strategy,
            options.search_depth,
            evaluation,
            StdRng::from_os_rng(),
        )?;
        agent.name = format!(
            "{}(depth={}, eval={})",
            options.strategy.as_str(),
            options.search_depth,
            evaluation.kind.name()
        );
        Ok(agent)
    }
}

impl<E, R: Rng> SearchAgent<E, R> {
    /// Builds an agent around any evaluator, e.g. a closure
    pub fn with_evaluator(
        strategy: Strategy,
        depth: u32,
        evaluator: E,
        rng: R,
    ) -> Result<Self, AgentError> {
        if depth == 0 {
            return Err(AgentError::InvalidDepth(depth));
        }

        Ok(SearchAgent {
            name: format!("{}(depth={})", strategy.as_str(), depth),
            strategy,
            depth,
            evaluator,
            rng,
            limits: SearchLimits::unlimited(),
            last_stats: None,
        })
    }

    /// Replaces the random source, e.g. with a seeded one for reproducible runs
    pub fn with_rng<R2: Rng>(self, rng: R2) -> SearchAgent<E, R2> {
        SearchAgent {
            name: self.name,
            strategy: self.strategy,
            depth: self.depth,
            evaluator: self.evaluator,
            rng,
            limits: self.limits,
            last_stats: self.last_stats,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Full search result (score and counters included) for `state`
    pub fn analyze<S>(&mut self, state: &S) -> Result<SearchOutcome<S::Action>, AgentError>
    where
        S: GameState,
        E: Evaluator<S>,
    {
        let outcome = search(
            state,
            self.strategy,
            self.depth,
            &self.evaluator,
            &mut self.rng,
            &self.limits,
        )?;
        self.last_stats = Some(outcome.stats);
        Ok(outcome)
    }
}

impl<S, E, R> Agent<S> for SearchAgent<E, R>
where
    S: GameState,
    E: Evaluator<S>,
    R: Rng,
{
    fn choose_action(&mut self, state: &S) -> Result<S::Action, AgentError> {
        let outcome = self.analyze(state)?;
        if outcome.stopped {
            info!(
                "{}: search budget exhausted after {} nodes",
                self.name, outcome.stats.nodes
            );
        }
        Ok(outcome.action)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats
    }
}

/// Greedy one-ply agent
pub struct ReflexAgent<E = ReflexEvaluation, R = StdRng> {
    name: String,
    evaluator: E,
    rng: R,
}

impl ReflexAgent<ReflexEvaluation, StdRng> {
    /// `"reflex"` selects the built-in reflex heuristic; any state evaluator
    /// name is applied to each successor
    pub fn new(evaluation_function: &str, weights: EvaluationWeights) -> Result<Self, AgentError> {
        let evaluator = ReflexEvaluation::from_name(evaluation_function, weights)?;
        let mut agent = ReflexAgent::with_evaluator(evaluator, StdRng::from_os_rng());
        agent.name = format!("reflex(eval={})", evaluation_function.trim());
        Ok(agent)
    }
}

impl<E, R: Rng> ReflexAgent<E, R> {
    pub fn with_evaluator(evaluator: E, rng: R) -> Self {
        ReflexAgent {
            name: "reflex".to_string(),
            evaluator,
            rng,
        }
    }

    pub fn with_rng<R2: Rng>(self, rng: R2) -> ReflexAgent<E, R2> {
        ReflexAgent {
            name: self.name,
            evaluator: self.evaluator,
            rng,
        }
    }
}

impl<S, E, R> Agent<S> for ReflexAgent<E, R>
where
    S: GameState,
    E: ActionEvaluator<S>,
    R: Rng,
{
    fn choose_action(&mut self, state: &S) -> Result<S::Action, AgentError> {
        let actions = state.legal_actions(MAXIMIZER);
        if actions.is_empty() {
            return Err(AgentError::NoLegalActions);
        }

        let scores: Vec<f64> = actions
            .iter()
            .map(|&action| self.evaluator.evaluate_action(state, action))
            .collect();
        let best_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut best: Vec<usize> = (0..actions.len())
            .filter(|&i| scores[i] == best_score)
            .collect();
        if best.is_empty() {
            // every score was NaN
            best = (0..actions.len()).collect();
        }

        let chosen = best[self.rng.random_range(0..best.len())];
        debug!(
            "{}: {} of {} actions tied at {:.3}",
            self.name,
            best.len(),
            actions.len(),
            best_score
        );
        Ok(actions[chosen])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Direction;

    const OPEN_ROOM: &str = "\
%%%%%%%
%P   .%
%     %
%G    %
%%%%%%%
";

    #[test]
    fn test_unknown_evaluation_function_fails_at_construction() {
        let options = AgentOptions {
            evaluation_function: "clairvoyance".to_string(),
            ..AgentOptions::default()
        };
        let err = SearchAgent::new(options).err();
        assert_eq!(
            err,
            Some(AgentError::UnknownEvaluationFunction("clairvoyance".to_string()))
        );
        assert!(ReflexAgent::new("clairvoyance", EvaluationWeights::default()).is_err());
    }

    #[test]
    fn test_zero_depth_fails_at_construction() {
        let options = AgentOptions {
            search_depth: 0,
            ..AgentOptions::default()
        };
        assert_eq!(SearchAgent::new(options).err(), Some(AgentError::InvalidDepth(0)));
    }

    #[test]
    fn test_agent_name_describes_configuration() {
        let agent = SearchAgent::new(AgentOptions {
            strategy: Strategy::AlphaBeta,
            evaluation_function: "betterEvaluationFunction".to_string(),
            search_depth: 3,
        })
        .unwrap();
        assert_eq!(Agent::<Board>::name(&agent), "alpha_beta(depth=3, eval=better)");
        assert_eq!(agent.depth(), 3);
        assert_eq!(agent.strategy(), Strategy::AlphaBeta);
    }

    #[test]
    fn test_search_agent_records_stats() {
        let board = Board::from_layout(OPEN_ROOM).unwrap();
        let mut agent = SearchAgent::new(AgentOptions::default())
            .unwrap()
            .with_rng(StdRng::seed_from_u64(1));
        assert!(Agent::<Board>::last_stats(&agent).is_none());

        let action = agent.choose_action(&board).unwrap();
        assert!(board.legal_actions(MAXIMIZER).contains(&action));
        let stats = Agent::<Board>::last_stats(&agent).unwrap();
        assert!(stats.nodes > 1);
        assert!(stats.evaluations > 0);
    }

    #[test]
    fn test_terminal_state_is_an_error() {
        let board = Board::from_layout("%%%%\n%P.%\n%%%%\n").unwrap();
        let won = board.successor(MAXIMIZER, Direction::Right);
        let mut agent = SearchAgent::new(AgentOptions::default()).unwrap();
        assert_eq!(agent.choose_action(&won), Err(AgentError::NoLegalActions));

        let mut reflex = ReflexAgent::new("reflex", EvaluationWeights::default()).unwrap();
        assert_eq!(reflex.choose_action(&won), Err(AgentError::NoLegalActions));
    }

    #[test]
    fn test_reflex_breaks_ties_among_best_only() {
        // Every move scores the same except Stop
        let board = Board::from_layout(OPEN_ROOM).unwrap();
        let evaluator = |_: &Board, action: Direction| {
            if action == Direction::Stop {
                -1.0
            } else {
                0.0
            }
        };
        let mut agent = ReflexAgent::with_evaluator(evaluator, StdRng::seed_from_u64(3));
        for _ in 0..50 {
            let action = agent.choose_action(&board).unwrap();
            assert!(matches!(action, Direction::Down | Direction::Right));
        }
    }

    #[test]
    fn test_agent_kind_strategy_mapping() {
        assert_eq!(AgentKind::Reflex.strategy(), None);
        assert_eq!(AgentKind::Minimax.strategy(), Some(Strategy::Minimax));
        assert_eq!(AgentKind::AlphaBeta.strategy(), Some(Strategy::AlphaBeta));
        assert_eq!(AgentKind::Expectimax.strategy(), Some(Strategy::Expectimax));
    }
}
