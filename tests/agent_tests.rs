// Agent scenarios on the reference board game
//
// Checks that lookahead agents avoid walking into an adversary that the
// greedy reflex agent ignores, and that repeated decisions on the same
// state stay within the best-scoring set.

use multiagent_search::agent::{Agent, AgentKind, AgentOptions, ReflexAgent, SearchAgent};
use multiagent_search::board::Board;
use multiagent_search::config::Config;
use multiagent_search::evaluation::{ActionEvaluator, EvaluationWeights, ReflexEvaluation};
use multiagent_search::game::{GameState, MAXIMIZER};
use multiagent_search::search::Strategy;
use multiagent_search::types::Direction;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The goal on the right sits next to the adversary
const BAITED_GOAL: &str = "\
%%%%%%%%
%. P.G %
%%%%%%%%
";

const OPEN_ROOM: &str = "\
%%%%%%%%
%P    .%
%  %%  %
%.    G%
%%%%%%%%
";

fn search_agent(strategy: Strategy, evaluation: &str, depth: u32) -> SearchAgent {
    SearchAgent::new(AgentOptions {
        strategy,
        evaluation_function: evaluation.to_string(),
        search_depth: depth,
    })
    .unwrap()
    .with_rng(StdRng::seed_from_u64(9))
}

#[test]
fn test_greedy_reflex_takes_the_bait() {
    let board = Board::from_layout(BAITED_GOAL).unwrap();
    let mut reflex = ReflexAgent::new("score", EvaluationWeights::default())
        .unwrap()
        .with_rng(StdRng::seed_from_u64(1));
    assert_eq!(reflex.choose_action(&board), Ok(Direction::Right));
}

#[test]
fn test_lookahead_avoids_the_bait() {
    let board = Board::from_layout(BAITED_GOAL).unwrap();
    assert_eq!(
        board.legal_actions(MAXIMIZER),
        vec![Direction::Left, Direction::Right, Direction::Stop]
    );

    for strategy in [Strategy::Minimax, Strategy::AlphaBeta] {
        let mut agent = search_agent(strategy, "score", 1);
        let outcome = agent.analyze(&board).unwrap();
        assert_eq!(outcome.action, Direction::Left, "{:?}", strategy);
        assert_eq!(outcome.score, -1.0, "{:?}", strategy);
    }

    // Right only averages (-491 + 9) / 2
    let mut agent = search_agent(Strategy::Expectimax, "score", 1);
    let outcome = agent.analyze(&board).unwrap();
    assert_eq!(outcome.action, Direction::Left);
    assert_eq!(outcome.score, -1.0);
}

#[test]
fn test_safe_goal_is_taken() {
    let board = Board::from_layout(
        "\
%%%%%%%
%P.  .%
%     %
%    G%
%%%%%%%
",
    )
    .unwrap();

    for strategy in [Strategy::Minimax, Strategy::AlphaBeta, Strategy::Expectimax] {
        let mut agent = search_agent(strategy, "score", 1);
        let outcome = agent.analyze(&board).unwrap();
        assert_eq!(outcome.action, Direction::Right, "{:?}", strategy);
        assert_eq!(outcome.score, 9.0, "{:?}", strategy);
    }
}

#[test]
fn test_alpha_beta_agrees_with_minimax_on_board() {
    let board = Board::from_layout(OPEN_ROOM).unwrap();
    for evaluation in ["score", "better"] {
        for depth in 1..=2 {
            let minimax = search_agent(Strategy::Minimax, evaluation, depth)
                .analyze(&board)
                .unwrap();
            let alpha_beta = search_agent(Strategy::AlphaBeta, evaluation, depth)
                .analyze(&board)
                .unwrap();
            assert_eq!(alpha_beta.action, minimax.action);
            assert_eq!(alpha_beta.score, minimax.score);
            assert!(alpha_beta.stats.nodes <= minimax.stats.nodes);
        }
    }
}

#[test]
fn test_repeated_reflex_choices_stay_in_best_set() {
    let board = Board::from_layout(OPEN_ROOM).unwrap();
    let evaluation = ReflexEvaluation::from_name("reflex", EvaluationWeights::default()).unwrap();

    let actions = board.legal_actions(MAXIMIZER);
    let scores: Vec<f64> = actions
        .iter()
        .map(|&a| evaluation.evaluate_action(&board, a))
        .collect();
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let best_set: Vec<Direction> = actions
        .iter()
        .zip(&scores)
        .filter(|&(_, &s)| s == best)
        .map(|(&a, _)| a)
        .collect();

    let mut agent = ReflexAgent::new("reflex", EvaluationWeights::default())
        .unwrap()
        .with_rng(StdRng::seed_from_u64(21));
    let first = agent.choose_action(&board).unwrap();
    let second = agent.choose_action(&board).unwrap();
    assert!(best_set.contains(&first), "{:?} not in {:?}", first, best_set);
    assert!(best_set.contains(&second), "{:?} not in {:?}", second, best_set);
}

#[test]
fn test_repeated_search_choices_are_stable() {
    let board = Board::from_layout(OPEN_ROOM).unwrap();
    for kind in [AgentKind::Minimax, AgentKind::AlphaBeta, AgentKind::Expectimax] {
        let mut config = Config::default_hardcoded();
        config.agent.kind = kind;
        let mut agent = config.build_agent().unwrap();
        let first = agent.choose_action(&board).unwrap();
        let second = agent.choose_action(&board).unwrap();
        assert_eq!(first, second, "{:?}", kind);
        assert!(agent.last_stats().is_some());
    }
}

#[test]
fn test_agent_plays_a_game_to_the_end() {
    // With no adversary the game ends once every goal is eaten
    let mut board = Board::from_layout("%%%%%%%\n%P....%\n%%%%%%%\n").unwrap();
    let mut agent = search_agent(Strategy::AlphaBeta, "score", 2);

    let mut moves = 0;
    while !board.is_terminal() && moves < 20 {
        let action = agent.choose_action(&board).unwrap();
        board = board.successor(MAXIMIZER, action);
        moves += 1;
    }
    assert!(board.is_win(), "agent never cleared the board:\n{}", board);
    assert_eq!(moves, 4);
    assert_eq!(board.score(), 4.0 * 9.0 + 500.0);
}
