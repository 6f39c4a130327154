// Errors surfaced by the agent layer

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Evaluation function name not present in the registry
    UnknownEvaluationFunction(String),
    /// Search depth must cover at least one full round
    InvalidDepth(u32),
    /// `choose_action` was called on a state where the maximizer cannot move
    NoLegalActions,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::UnknownEvaluationFunction(name) => {
                write!(f, "unknown evaluation function '{}'", name)
            }
            AgentError::InvalidDepth(depth) => {
                write!(f, "search depth must be at least 1, got {}", depth)
            }
            AgentError::NoLegalActions => write!(f, "no legal actions for the maximizer"),
        }
    }
}

impl std::error::Error for AgentError {}
