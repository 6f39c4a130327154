// Configuration module for reading Agent.toml
// Holds the agent selection, search budgets, evaluation weights and debug options

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::agent::{Agent, AgentKind, AgentOptions, ReflexAgent, SearchAgent};
use crate::board::Board;
use crate::error::AgentError;
use crate::evaluation::EvaluationWeights;
use crate::search::SearchLimits;

/// Default location of the configuration file
pub const CONFIG_FILE: &str = "Agent.toml";

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub evaluation: EvaluationWeights,
    pub debug: DebugConfig,
}

/// Which agent to build and how deep it searches
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AgentConfig {
    pub kind: AgentKind,
    pub evaluation_function: String,
    /// Full rounds; ignored by the reflex agent
    pub search_depth: u32,
    /// Fixed seed for tie-breaking and chance nodes; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Optional search budgets; both unlimited when absent
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub max_nodes: Option<u64>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_nodes: self.max_nodes,
            move_time: self.time_budget_ms.map(Duration::from_millis),
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Agent.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Agent.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file(CONFIG_FILE)
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values in Agent.toml
    pub fn default_hardcoded() -> Self {
        Config {
            agent: AgentConfig {
                kind: AgentKind::Expectimax,
                evaluation_function: "better".to_string(),
                search_depth: 2,
                seed: None,
            },
            search: SearchConfig {
                max_nodes: None,
                time_budget_ms: None,
            },
            evaluation: EvaluationWeights {
                goal_weight: 1.0,
                threat_weight: 1.0,
                no_goals_score: 1000.0,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "search_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load {} ({}), using hardcoded defaults",
                CONFIG_FILE, e
            );
            Self::default_hardcoded()
        })
    }

    fn rng(&self) -> StdRng {
        match self.agent.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Builds the configured agent for the reference board game.
    /// Fails on an unknown evaluation function or a zero search depth.
    pub fn build_agent(&self) -> Result<Box<dyn Agent<Board> + Send>, AgentError> {
        match self.agent.kind.strategy() {
            None => {
                let agent = ReflexAgent::new(&self.agent.evaluation_function, self.evaluation)?
                    .with_rng(self.rng());
                Ok(Box::new(agent))
            }
            Some(strategy) => {
                let options = AgentOptions {
                    strategy,
                    evaluation_function: self.agent.evaluation_function.clone(),
                    search_depth: self.agent.search_depth,
                };
                let agent = SearchAgent::with_weights(options, self.evaluation)?
                    .with_rng(self.rng())
                    .with_limits(self.search.limits());
                Ok(Box::new(agent))
            }
        }
    }
}
