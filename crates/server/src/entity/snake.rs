//! Snake body representation.

use protocol::{Direction, Point};
use std::collections::VecDeque;

/// An ordered snake body; the head is the front element. Length stays >= 1
/// while the owning player is active.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    /// Build a snake of `length` cells with the head at `head` and the body
    /// trailing away in `tail_dir`.
    pub fn new(head: Point, length: usize, tail_dir: Direction) -> Self {
        let mut body = VecDeque::with_capacity(length.max(1));
        body.push_back(head);
        let mut cell = head;
        for _ in 1..length.max(1) {
            cell = tail_dir.apply(cell);
            body.push_back(cell);
        }
        Self { body }
    }

    pub fn head(&self) -> Point {
        // Non-empty by construction.
        *self.body.front().expect("snake body is never empty")
    }

    pub fn tail(&self) -> Point {
        *self.body.back().expect("snake body is never empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    /// Whether any segment occupies `p`.
    pub fn contains(&self, p: Point) -> bool {
        self.body.contains(&p)
    }

    /// Whether moving onto `p` would hit this body, ignoring the tail cell
    /// that is about to be vacated.
    pub fn hits_self(&self, p: Point) -> bool {
        self.body.iter().take(self.body.len().saturating_sub(1)).any(|c| *c == p)
    }

    /// The neck is the segment directly behind the head.
    pub fn neck(&self) -> Option<Point> {
        self.body.get(1).copied()
    }

    /// Commit a move: push the new head and, unless the snake grew, pop the
    /// tail. Returns the vacated tail cell when one was popped.
    pub fn advance(&mut self, new_head: Point, grew: bool) -> Option<Point> {
        self.body.push_front(new_head);
        if grew { None } else { self.body.pop_back() }
    }

    /// Append `count` copies of the tail segment (giant effect).
    pub fn extend_tail(&mut self, count: usize) {
        let tail = self.tail();
        for _ in 0..count {
            self.body.push_back(tail);
        }
    }

    /// Remove the tail segment (poison). Returns false when the snake is a
    /// single cell and cannot shrink.
    pub fn shrink_tail(&mut self) -> bool {
        if self.body.len() <= 1 {
            return false;
        }
        self.body.pop_back();
        true
    }

    /// Clamp the body to `max` cells by truncating the tail.
    pub fn clamp_len(&mut self, max: usize) {
        while self.body.len() > max {
            self.body.pop_back();
        }
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.body.iter().copied().collect()
    }
}
