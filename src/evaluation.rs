// Static evaluation functions
//
// A state evaluator maps a snapshot to a desirability score (higher is better
// for the maximizer). The reflex agent instead scores (state, action) pairs.
// Built-in evaluators are looked up by name once, when an agent is built.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::game::{GameState, MAXIMIZER};
use crate::types::{manhattan_distance, Coord, Grid};

/// Scores a state from the maximizer's point of view
pub trait Evaluator<S: GameState> {
    fn evaluate(&self, state: &S) -> f64;
}

impl<S, F> Evaluator<S> for F
where
    S: GameState,
    F: Fn(&S) -> f64,
{
    fn evaluate(&self, state: &S) -> f64 {
        self(state)
    }
}

/// Scores one maximizer action taken from `state`
pub trait ActionEvaluator<S: GameState> {
    fn evaluate_action(&self, state: &S, action: S::Action) -> f64;
}

impl<S, F> ActionEvaluator<S> for F
where
    S: GameState,
    F: Fn(&S, S::Action) -> f64,
{
    fn evaluate_action(&self, state: &S, action: S::Action) -> f64 {
        self(state, action)
    }
}

/// Tunable constants of the positional heuristic
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct EvaluationWeights {
    pub goal_weight: f64,
    pub threat_weight: f64,
    /// Goal term used once every goal has been collected
    pub no_goals_score: f64,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        EvaluationWeights {
            goal_weight: 1.0,
            threat_weight: 1.0,
            no_goals_score: 1000.0,
        }
    }
}

/// Registry of built-in state evaluators
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// The game's own running score
    Score,
    /// Goal proximity versus goal spread, plus distance from the nearest threat
    Better,
}

impl EvaluationKind {
    pub const ALL: [EvaluationKind; 2] = [EvaluationKind::Score, EvaluationKind::Better];

    /// Resolves a configured name; both short and long spellings are accepted
    pub fn from_name(name: &str) -> Result<EvaluationKind, AgentError> {
        match name.trim() {
            "score" | "scoreEvaluationFunction" => Ok(EvaluationKind::Score),
            "better" | "betterEvaluationFunction" => Ok(EvaluationKind::Better),
            other => Err(AgentError::UnknownEvaluationFunction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvaluationKind::Score => "score",
            EvaluationKind::Better => "better",
        }
    }
}

/// A resolved state evaluator together with its weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub kind: EvaluationKind,
    pub weights: EvaluationWeights,
}

impl Evaluation {
    pub fn new(kind: EvaluationKind) -> Self {
        Evaluation {
            kind,
            weights: EvaluationWeights::default(),
        }
    }

    pub fn from_name(name: &str, weights: EvaluationWeights) -> Result<Self, AgentError> {
        Ok(Evaluation {
            kind: EvaluationKind::from_name(name)?,
            weights,
        })
    }
}

impl<S: GameState> Evaluator<S> for Evaluation {
    fn evaluate(&self, state: &S) -> f64 {
        match self.kind {
            EvaluationKind::Score => score_evaluation(state),
            EvaluationKind::Better => better_evaluation(state, &self.weights),
        }
    }
}

/// Returns the game's score unchanged
pub fn score_evaluation<S: GameState>(state: &S) -> f64 {
    state.score()
}

/// Positional heuristic applied to the state's own maximizer, threats and goals
pub fn better_evaluation<S: GameState>(state: &S, weights: &EvaluationWeights) -> f64 {
    positional_score(
        state.maximizer_position(),
        &state.adversary_positions(),
        state.remaining_goals(),
        weights,
    )
}

/// Combines a goal term and a threat term for a maximizer standing at `position`.
///
/// With `g` the goal distances and `t` the threat distances:
/// - goal term: `1 / (min(g) / (max(g) - min(g) + 1) + 1)`
/// - threat term: `min(t) / (min(g) + 1)`
///
/// When no goals remain the goal term becomes `no_goals_score` and the threat
/// term is left unscaled. With no threats the threat term is zero.
pub fn positional_score(
    position: Coord,
    threats: &[Coord],
    goals: &Grid,
    weights: &EvaluationWeights,
) -> f64 {
    let nearest_threat = threats
        .iter()
        .map(|&t| manhattan_distance(position, t))
        .min()
        .map_or(0.0, f64::from);

    let goal_distances: Vec<i32> = goals
        .positions()
        .into_iter()
        .map(|g| manhattan_distance(position, g))
        .collect();

    let (nearest_goal, farthest_goal) = match (
        goal_distances.iter().min(),
        goal_distances.iter().max(),
    ) {
        (Some(&min), Some(&max)) => (f64::from(min), f64::from(max)),
        _ => return weights.no_goals_score + weights.threat_weight * nearest_threat,
    };

    let spread_ratio = nearest_goal / (farthest_goal - nearest_goal + 1.0);
    let goal_score = 1.0 / (spread_ratio + 1.0);
    let threat_score = nearest_threat / (nearest_goal + 1.0);

    weights.goal_weight * goal_score + weights.threat_weight * threat_score
}

/// Evaluators available to the reflex agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReflexEvaluation {
    /// Positional heuristic on the successor's positions against the goals
    /// still present before the move
    Positional(EvaluationWeights),
    /// Any state evaluator applied to the successor
    Successor(Evaluation),
}

impl ReflexEvaluation {
    /// `"reflex"` selects the positional reflex heuristic; any state
    /// evaluator name is applied one ply ahead
    pub fn from_name(name: &str, weights: EvaluationWeights) -> Result<Self, AgentError> {
        match name.trim() {
            "reflex" | "reflexEvaluationFunction" => Ok(ReflexEvaluation::Positional(weights)),
            other => Ok(ReflexEvaluation::Successor(Evaluation::from_name(
                other, weights,
            )?)),
        }
    }
}

impl<S: GameState> ActionEvaluator<S> for ReflexEvaluation {
    fn evaluate_action(&self, state: &S, action: S::Action) -> f64 {
        let successor = state.successor(MAXIMIZER, action);
        match self {
            ReflexEvaluation::Positional(weights) => positional_score(
                successor.maximizer_position(),
                &successor.adversary_positions(),
                state.remaining_goals(),
                weights,
            ),
            ReflexEvaluation::Successor(evaluation) => evaluation.evaluate(&successor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Direction;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_positional_score_formula() {
        let goals = Grid::from_positions(8, 4, &[Coord::new(2, 0), Coord::new(5, 0)]);
        let score = positional_score(
            Coord::new(0, 0),
            &[Coord::new(0, 3)],
            &goals,
            &EvaluationWeights::default(),
        );
        // ratio = 2 / (5 - 2 + 1) = 0.5, goal = 1 / 1.5, threat = 3 / (2 + 1)
        assert!(approx(score, 1.0 / 1.5 + 1.0), "got {}", score);
    }

    #[test]
    fn test_positional_score_prefers_nearer_goal() {
        let goals = Grid::from_positions(10, 1, &[Coord::new(9, 0)]);
        let weights = EvaluationWeights::default();
        let far = positional_score(Coord::new(0, 0), &[], &goals, &weights);
        let near = positional_score(Coord::new(8, 0), &[], &goals, &weights);
        assert!(near > far);
    }

    #[test]
    fn test_positional_score_prefers_distance_from_threat() {
        let goals = Grid::from_positions(10, 10, &[Coord::new(0, 9)]);
        let weights = EvaluationWeights::default();
        let close = positional_score(Coord::new(0, 0), &[Coord::new(1, 0)], &goals, &weights);
        let away = positional_score(Coord::new(0, 0), &[Coord::new(5, 5)], &goals, &weights);
        assert!(away > close);
    }

    #[test]
    fn test_positional_score_without_goals_is_fixed_high_score() {
        let goals = Grid::new(5, 5);
        let weights = EvaluationWeights::default();
        let score = positional_score(Coord::new(0, 0), &[Coord::new(2, 1)], &goals, &weights);
        assert!(approx(score, 1000.0 + 3.0));
        assert!(score.is_finite());
    }

    #[test]
    fn test_positional_score_without_threats() {
        let goals = Grid::from_positions(5, 5, &[Coord::new(1, 0)]);
        let score = positional_score(Coord::new(0, 0), &[], &goals, &EvaluationWeights::default());
        // single goal: ratio = 1 / 1, goal term = 0.5
        assert!(approx(score, 0.5));
    }

    #[test]
    fn test_weights_scale_terms() {
        let goals = Grid::from_positions(5, 5, &[Coord::new(1, 0)]);
        let weights = EvaluationWeights {
            goal_weight: 2.0,
            threat_weight: 0.0,
            no_goals_score: 0.0,
        };
        let score = positional_score(Coord::new(0, 0), &[Coord::new(4, 4)], &goals, &weights);
        assert!(approx(score, 1.0));
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(EvaluationKind::from_name("score").unwrap(), EvaluationKind::Score);
        assert_eq!(
            EvaluationKind::from_name("scoreEvaluationFunction").unwrap(),
            EvaluationKind::Score
        );
        assert_eq!(EvaluationKind::from_name("better").unwrap(), EvaluationKind::Better);
        assert_eq!(
            EvaluationKind::from_name("betterEvaluationFunction").unwrap(),
            EvaluationKind::Better
        );
        assert_eq!(
            EvaluationKind::from_name("nope"),
            Err(AgentError::UnknownEvaluationFunction("nope".to_string()))
        );
        for kind in EvaluationKind::ALL {
            assert_eq!(EvaluationKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_score_evaluation_reads_game_score() {
        let board = Board::from_layout("%%%%%\n%P..%\n%%%%%\n").unwrap();
        let next = board.successor(MAXIMIZER, Direction::Right);
        assert_eq!(Evaluation::new(EvaluationKind::Score).evaluate(&next), 9.0);
    }

    #[test]
    fn test_reflex_positional_uses_current_goals() {
        let board = Board::from_layout("%%%%%%\n%P. G%\n%%%%%%\n").unwrap();
        let reflex = ReflexEvaluation::from_name("reflex", EvaluationWeights::default()).unwrap();
        // Stepping onto the goal: goal distance 0 against the pre-move grid
        let eat = reflex.evaluate_action(&board, Direction::Right);
        let wait = reflex.evaluate_action(&board, Direction::Stop);
        // eat: goal term 1, threat 2 / 1; wait: goal term 0.5, threat 3 / 2
        assert!(approx(eat, 3.0), "got {}", eat);
        assert!(approx(wait, 2.0), "got {}", wait);
    }

    #[test]
    fn test_reflex_successor_wraps_state_evaluator() {
        let board = Board::from_layout("%%%%%\n%P..%\n%%%%%\n").unwrap();
        let reflex = ReflexEvaluation::from_name("score", EvaluationWeights::default()).unwrap();
        assert_eq!(reflex.evaluate_action(&board, Direction::Right), 9.0);
        assert_eq!(reflex.evaluate_action(&board, Direction::Stop), -1.0);
        assert!(ReflexEvaluation::from_name("bogus", EvaluationWeights::default()).is_err());
    }
}
