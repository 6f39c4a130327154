// Reference grid game: one goal-collecting maximizer chased by adversaries
//
// This is the concrete `GameState` used by the server, the replay tool and the
// scenario tests. Rules:
// - the maximizer may step into any open cell or stop; each step costs a point
// - eating a goal is worth GOAL_REWARD; clearing the board adds WIN_REWARD and wins
// - adversaries never stop and never reverse unless reversing is their only move
// - sharing a cell with an adversary costs LOSS_PENALTY and loses
// Finished games expose no legal actions for anyone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{GameState, MAXIMIZER};
use crate::types::{Coord, Direction, Grid};

pub const TIME_PENALTY: f64 = 1.0;
pub const GOAL_REWARD: f64 = 10.0;
pub const WIN_REWARD: f64 = 500.0;
pub const LOSS_PENALTY: f64 = 500.0;

/// How a finished game ended, from the maximizer's point of view
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

/// Position and last heading of one adversary
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adversary {
    pub position: Coord,
    #[serde(default = "default_heading")]
    pub heading: Direction,
}

fn default_heading() -> Direction {
    Direction::Stop
}

/// Immutable game snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    walls: Grid,
    goals: Grid,
    maximizer: Coord,
    adversaries: Vec<Adversary>,
    score: f64,
    outcome: Option<Outcome>,
}

/// JSON representation used by the HTTP API and debug logs
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BoardState {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub walls: Vec<Coord>,
    #[serde(default)]
    pub goals: Vec<Coord>,
    pub maximizer: Coord,
    #[serde(default)]
    pub adversaries: Vec<Adversary>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl Board {
    /// Parses an ASCII layout: `%` wall, `.` or `o` goal, `P` maximizer,
    /// `G` adversary, space for an empty cell. The first text row is the top
    /// of the board (highest y). Adversaries are numbered in reading order.
    pub fn from_layout(layout: &str) -> Result<Board, String> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .collect();

        if rows.is_empty() {
            return Err("Layout is empty".to_string());
        }

        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;

        let mut walls = Grid::new(width, height);
        let mut goals = Grid::new(width, height);
        let mut maximizer = None;
        let mut adversaries = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (col, ch) in line.chars().enumerate() {
                let pos = Coord { x: col as i32, y };
                match ch {
                    '%' => walls.set(pos, true),
                    '.' | 'o' => goals.set(pos, true),
                    'P' => {
                        if maximizer.replace(pos).is_some() {
                            return Err(format!(
                                "Layout has more than one maximizer (second at row {}, column {})",
                                row + 1,
                                col + 1
                            ));
                        }
                    }
                    'G' => adversaries.push(Adversary {
                        position: pos,
                        heading: Direction::Stop,
                    }),
                    ' ' => {}
                    other => {
                        return Err(format!(
                            "Unknown layout character '{}' at row {}, column {}",
                            other,
                            row + 1,
                            col + 1
                        ))
                    }
                }
            }
        }

        let maximizer = maximizer.ok_or("Layout has no maximizer ('P')")?;

        Ok(Board {
            walls,
            goals,
            maximizer,
            adversaries,
            score: 0.0,
            outcome: None,
        })
    }

    pub fn width(&self) -> i32 {
        self.walls.width()
    }

    pub fn height(&self) -> i32 {
        self.walls.height()
    }

    pub fn walls(&self) -> &Grid {
        &self.walls
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    pub fn is_lose(&self) -> bool {
        self.outcome == Some(Outcome::Lose)
    }

    /// A cell is open when it is on the board and not a wall
    fn is_open(&self, pos: Coord) -> bool {
        self.walls.in_bounds(pos) && !self.walls.get(pos)
    }

    fn open_moves(&self, from: Coord) -> Vec<Direction> {
        Direction::moves()
            .iter()
            .filter(|dir| self.is_open(dir.apply(&from)))
            .copied()
            .collect()
    }

    fn check_collision(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if self.adversaries.iter().any(|a| a.position == self.maximizer) {
            self.score -= LOSS_PENALTY;
            self.outcome = Some(Outcome::Lose);
        }
    }

    fn assert_agent(&self, agent: usize) {
        assert!(
            agent < self.num_agents(),
            "agent index {} out of range for a game with {} agents",
            agent,
            self.num_agents()
        );
    }

    /// Renders the board in layout notation
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height()).rev() {
            for x in 0..self.width() {
                let pos = Coord { x, y };
                let ch = if self.adversaries.iter().any(|a| a.position == pos) {
                    'G'
                } else if self.maximizer == pos {
                    'P'
                } else if self.walls.get(pos) {
                    '%'
                } else if self.goals.get(pos) {
                    '.'
                } else {
                    ' '
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())?;
        write!(f, "score: {}", self.score)
    }
}

impl GameState for Board {
    type Action = Direction;

    fn legal_actions(&self, agent: usize) -> Vec<Direction> {
        self.assert_agent(agent);

        if self.outcome.is_some() {
            return vec![];
        }

        if agent == MAXIMIZER {
            let mut actions = self.open_moves(self.maximizer);
            actions.push(Direction::Stop);
            return actions;
        }

        let adversary = &self.adversaries[agent - 1];
        let open = self.open_moves(adversary.position);
        if open.is_empty() {
            // Walled in on all sides
            return vec![Direction::Stop];
        }

        let backwards = adversary.heading.reverse();
        let forward: Vec<Direction> = open.iter().filter(|&&d| d != backwards).copied().collect();
        if forward.is_empty() {
            open
        } else {
            forward
        }
    }

    fn successor(&self, agent: usize, action: Direction) -> Board {
        self.assert_agent(agent);
        assert!(
            self.outcome.is_none(),
            "agent {} cannot act after the game has ended ({:?})",
            agent,
            self.outcome
        );
        assert!(
            self.legal_actions(agent).contains(&action),
            "{:?} is not a legal action for agent {}",
            action,
            agent
        );

        let mut next = self.clone();

        if agent == MAXIMIZER {
            let pos = action.apply(&self.maximizer);
            next.maximizer = pos;
            next.score -= TIME_PENALTY;

            if next.goals.get(pos) {
                next.goals.set(pos, false);
                next.score += GOAL_REWARD;
                if next.goals.count() == 0 {
                    next.score += WIN_REWARD;
                    next.outcome = Some(Outcome::Win);
                    return next;
                }
            }
        } else {
            let adversary = &mut next.adversaries[agent - 1];
            adversary.position = action.apply(&adversary.position);
            if action != Direction::Stop {
                adversary.heading = action;
            }
        }

        next.check_collision();
        next
    }

    fn num_agents(&self) -> usize {
        1 + self.adversaries.len()
    }

    fn maximizer_position(&self) -> Coord {
        self.maximizer
    }

    fn adversary_positions(&self) -> Vec<Coord> {
        self.adversaries.iter().map(|a| a.position).collect()
    }

    fn remaining_goals(&self) -> &Grid {
        &self.goals
    }

    fn score(&self) -> f64 {
        self.score
    }
}

impl From<&Board> for BoardState {
    fn from(board: &Board) -> Self {
        BoardState {
            width: board.width(),
            height: board.height(),
            walls: board.walls.positions(),
            goals: board.goals.positions(),
            maximizer: board.maximizer,
            adversaries: board.adversaries.clone(),
            score: board.score,
            outcome: board.outcome,
        }
    }
}

impl TryFrom<BoardState> for Board {
    type Error = String;

    fn try_from(state: BoardState) -> Result<Board, String> {
        if state.width <= 0 || state.height <= 0 {
            return Err(format!(
                "Board dimensions must be positive, got {}x{}",
                state.width, state.height
            ));
        }

        let bounds = Grid::new(state.width, state.height);
        let check = |what: &str, pos: Coord| -> Result<(), String> {
            if bounds.in_bounds(pos) {
                Ok(())
            } else {
                Err(format!("{} at ({}, {}) is out of bounds", what, pos.x, pos.y))
            }
        };

        for &pos in &state.walls {
            check("Wall", pos)?;
        }
        for &pos in &state.goals {
            check("Goal", pos)?;
        }
        check("Maximizer", state.maximizer)?;
        for adversary in &state.adversaries {
            check("Adversary", adversary.position)?;
        }

        let walls = Grid::from_positions(state.width, state.height, &state.walls);
        if walls.get(state.maximizer) {
            return Err("Maximizer is inside a wall".to_string());
        }
        if let Some(a) = state.adversaries.iter().find(|a| walls.get(a.position)) {
            return Err(format!(
                "Adversary at ({}, {}) is inside a wall",
                a.position.x, a.position.y
            ));
        }

        Ok(Board {
            walls,
            goals: Grid::from_positions(state.width, state.height, &state.goals),
            maximizer: state.maximizer,
            adversaries: state.adversaries,
            score: state.score,
            outcome: state.outcome,
        })
    }
}
