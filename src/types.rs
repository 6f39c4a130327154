// Shared value types: coordinates, the action vocabulary and boolean grids
// Wire-facing types derive serde so they can travel through the HTTP API and debug logs

use serde::{Deserialize, Serialize};

use crate::board::BoardState;

/// Game metadata sent with every request
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Game {
    pub id: String,
}

/// Request body for /start, /move and /end
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub game: Game,
    pub turn: i32,
    pub board: BoardState,
}

/// 2D coordinate on the board (y grows upwards)
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }
}

/// Calculates Manhattan distance between two coordinates
pub fn manhattan_distance(a: Coord, b: Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// The five moves an agent can make on the grid
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stop,
}

impl Direction {
    /// Returns the four movement directions in enumeration order
    pub fn moves() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Stop => "stop",
        }
    }

    /// Parses a direction name (case-insensitive)
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "stop" => Ok(Direction::Stop),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => Coord { x: coord.x, y: coord.y + 1 },
            Direction::Down => Coord { x: coord.x, y: coord.y - 1 },
            Direction::Left => Coord { x: coord.x - 1, y: coord.y },
            Direction::Right => Coord { x: coord.x + 1, y: coord.y },
            Direction::Stop => *coord,
        }
    }

    /// The opposite heading; `Stop` is its own reverse
    pub fn reverse(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Stop => Direction::Stop,
        }
    }
}

/// Binary occupancy map with spatial extent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates an empty grid
    ///
    /// # Panics
    /// Panics on negative dimensions.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width >= 0 && height >= 0,
            "grid dimensions must be non-negative, got {}x{}",
            width,
            height
        );
        Grid {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    /// Builds a grid with the given cells set
    pub fn from_positions(width: i32, height: i32, positions: &[Coord]) -> Self {
        let mut grid = Grid::new(width, height);
        for &pos in positions {
            grid.set(pos, true);
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Out-of-bounds cells read as unoccupied
    pub fn get(&self, pos: Coord) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)]
    }

    /// # Panics
    /// Panics if `pos` lies outside the grid.
    pub fn set(&mut self, pos: Coord, value: bool) {
        assert!(
            self.in_bounds(pos),
            "({}, {}) is outside a {}x{} grid",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        let idx = self.index(pos);
        self.cells[idx] = value;
    }

    /// Number of occupied cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied cells, iterating x-major then y
    pub fn positions(&self) -> Vec<Coord> {
        let mut out = Vec::with_capacity(self.count());
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = Coord { x, y };
                if self.get(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }

    fn index(&self, pos: Coord) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}
