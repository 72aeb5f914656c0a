//! Shared protocol crate for the snake game server.
//!
//! This crate contains:
//! - Grid and color primitives shared by server and clients
//! - JSON message definitions (client -> server and server -> client)
//! - Per-mode state snapshot documents with wire-stable field names

mod error;
pub mod messages;
pub mod snapshot;

pub use error::ProtocolError;

use serde::{Deserialize, Serialize};

/// Stable player identifier chosen by the client at join time.
pub type PlayerId = String;

/// A cell on the game grid. Serialized as `[x, y]` for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Grid (Manhattan) distance to another point.
    pub fn manhattan(&self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// One-cell step with the target clamped to the four cardinal axes,
    /// moving each axis at most one cell toward `target`.
    pub fn step_toward(&self, target: Point) -> Point {
        Point::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// RGB color used for snakes. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "(u8, u8, u8)", into = "(u8, u8, u8)")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for (u8, u8, u8) {
    fn from(c: Color) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Cardinal movement direction. The wire uses the uppercase names the
/// original clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The 180-degree opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit grid vector for this direction. Up is negative y.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Apply this direction to a point.
    pub fn apply(&self, p: Point) -> Point {
        let (dx, dy) = self.delta();
        Point::new(p.x + dx, p.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_serializes_as_tuple() {
        let json = serde_json::to_string(&Point::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let back: Point = serde_json::from_str("[3,7]").unwrap();
        assert_eq!(back, Point::new(3, 7));
    }

    #[test]
    fn direction_wire_names_are_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"UP\"");
        let d: Direction = serde_json::from_str("\"LEFT\"").unwrap();
        assert_eq!(d, Direction::Left);
    }

    #[test]
    fn opposite_round_trips() {
        for d in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn step_toward_moves_one_cell_per_axis() {
        let p = Point::new(5, 5);
        assert_eq!(p.step_toward(Point::new(9, 5)), Point::new(6, 5));
        assert_eq!(p.step_toward(Point::new(0, 0)), Point::new(4, 4));
        assert_eq!(p.step_toward(p), p);
    }
}
