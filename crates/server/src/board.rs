//! Board geometry and spatial queries.
//!
//! The board itself is stateless: occupancy is always passed in as a
//! snapshot of the currently occupied cells, so these are pure functions
//! over grid geometry.

use protocol::Point;
use rand::Rng;
use std::collections::HashSet;

/// An axis-aligned cell rectangle, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }
}

/// Grid dimensions plus the spatial queries every mode shares.
#[derive(Debug, Clone, Copy)]
pub struct Board {
    pub width: i32,
    pub height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies on the board.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// Wrap an out-of-bounds point to the opposite edge.
    pub fn wrap(&self, p: Point) -> Point {
        let mut x = p.x;
        let mut y = p.y;
        if x < 0 {
            x = self.width - 1;
        } else if x >= self.width {
            x = 0;
        }
        if y < 0 {
            y = self.height - 1;
        } else if y >= self.height {
            y = 0;
        }
        Point::new(x, y)
    }

    /// Board center cell.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let w = self.width;
        let h = self.height;
        (0..w).flat_map(move |x| (0..h).map(move |y| Point::new(x, y)))
    }

    /// Uniformly sample a free cell, with a deterministic `(0, 0)` fallback
    /// when the board is fully occupied.
    pub fn random_empty_cell<R: Rng>(&self, occupied: &HashSet<Point>, rng: &mut R) -> Point {
        let empty: Vec<Point> = self.cells().filter(|c| !occupied.contains(c)).collect();
        if empty.is_empty() {
            return Point::new(0, 0);
        }
        empty[rng.random_range(0..empty.len())]
    }

    /// Like [`Self::random_empty_cell`], restricted to cells inside `rect`.
    /// Returns `None` when no free cell exists there.
    pub fn random_empty_cell_in<R: Rng>(
        &self,
        rect: Rect,
        occupied: &HashSet<Point>,
        rng: &mut R,
    ) -> Option<Point> {
        let empty: Vec<Point> = self
            .cells()
            .filter(|c| rect.contains(*c) && !occupied.contains(c))
            .collect();
        if empty.is_empty() {
            return None;
        }
        Some(empty[rng.random_range(0..empty.len())])
    }

    /// All on-board cells within a Manhattan radius of `origin`, excluding
    /// the origin itself.
    pub fn cells_within_manhattan(&self, origin: Point, radius: i32) -> Vec<Point> {
        let mut out = Vec::new();
        for dx in -radius..=radius {
            let rest = radius - dx.abs();
            for dy in -rest..=rest {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let p = Point::new(origin.x + dx, origin.y + dy);
                if self.contains(p) {
                    out.push(p);
                }
            }
        }
        out
    }
}
