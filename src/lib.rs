// Library exports for the multi-agent search engine
// The server binary, the replay tool and the integration tests all build on these

pub mod agent;
pub mod board;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod handler;
pub mod replay;
pub mod search;
pub mod types;
