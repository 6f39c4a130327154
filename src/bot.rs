// Bot: the HTTP-facing driver around one configured agent
//
// The bot owns the agent for its whole lifetime. Each /move request converts
// the wire board, runs the (CPU-bound) search on the blocking pool and
// replies with the chosen direction.

use log::info;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::agent::Agent;
use crate::board::{Board, BoardState};
use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::error::AgentError;
use crate::types::Game;

/// Search bot with an OOP-style API mirroring the HTTP endpoints
pub struct Bot {
    config: Config,
    agent: Arc<Mutex<Box<dyn Agent<Board> + Send>>>,
    agent_name: String,
    logger: DebugLogger,
}

impl Bot {
    /// Builds the configured agent up front so configuration mistakes are
    /// reported at startup
    pub fn new(config: Config, logger: DebugLogger) -> Result<Self, AgentError> {
        let agent = config.build_agent()?;
        let agent_name = agent.name().to_string();
        info!("Agent ready: {}", agent_name);

        Ok(Bot {
            config,
            agent: Arc::new(Mutex::new(agent)),
            agent_name,
            logger,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns agent metadata
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "agent": self.agent_name,
            "kind": self.config.agent.kind,
            "evaluation_function": self.config.agent.evaluation_function,
            "search_depth": self.config.agent.search_depth,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: i32, board: &BoardState) {
        info!(
            "GAME START {} ({}x{}, {} adversaries)",
            game.id,
            board.width,
            board.height,
            board.adversaries.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: i32, board: &BoardState) {
        info!(
            "GAME OVER {} at turn {} (score {}, outcome {:?})",
            game.id, turn, board.score, board.outcome
        );
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// # Returns
    /// * `Ok(Value)` - `{"move": "<direction>"}`
    /// * `Err(String)` - the board was malformed or the maximizer cannot act
    pub async fn get_move(
        &self,
        _game: &Game,
        turn: i32,
        board: &BoardState,
    ) -> Result<Value, String> {
        let start_time = Instant::now();
        let state = Board::try_from(board.clone())?;

        let agent = self.agent.clone();
        let (chosen, stats) = tokio::task::spawn_blocking(move || {
            let mut agent = agent.lock();
            let chosen = agent.choose_action(&state);
            (chosen, agent.last_stats())
        })
        .await
        .map_err(|e| format!("Search task failed: {}", e))?;

        let chosen = chosen.map_err(|e| format!("Turn {}: {}", turn, e))?;

        info!(
            "Turn {}: Chose {} (nodes: {}, time: {}ms)",
            turn,
            chosen.as_str(),
            stats.map_or(0, |s| s.nodes),
            start_time.elapsed().as_millis()
        );

        self.logger.log_move(turn, board.clone(), chosen, stats);

        Ok(json!({ "move": chosen.as_str() }))
    }
}
