//! CTF flag state.
//!
//! The flag is a tagged union so that contradictory combinations (captured
//! without a carrier, a carrier on an uncaptured flag) cannot be
//! represented.

use protocol::snapshot::FlagView;
use protocol::{PlayerId, Point};

/// Where a flag currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagState {
    /// Sitting at its home base.
    AtBase,
    /// Dropped loose on the board after its carrier was eliminated.
    Dropped(Point),
    /// Carried by a player; the position tracks that player's head.
    Carried(PlayerId),
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub base: Point,
    pub state: FlagState,
}

impl Flag {
    pub fn new(base: Point) -> Self {
        Self {
            base,
            state: FlagState::AtBase,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self.state, FlagState::Carried(_))
    }

    pub fn carrier(&self) -> Option<&PlayerId> {
        match &self.state {
            FlagState::Carried(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_carried_by(&self, id: &PlayerId) -> bool {
        self.carrier().is_some_and(|c| c == id)
    }

    /// The flag's board position; `carrier_head` resolves the carried case.
    pub fn position(&self, carrier_head: Option<Point>) -> Point {
        match self.state {
            FlagState::AtBase => self.base,
            FlagState::Dropped(p) => p,
            FlagState::Carried(_) => carrier_head.unwrap_or(self.base),
        }
    }

    pub fn capture(&mut self, carrier: PlayerId) {
        self.state = FlagState::Carried(carrier);
    }

    pub fn drop_at(&mut self, pos: Point) {
        self.state = FlagState::Dropped(pos);
    }

    pub fn return_to_base(&mut self) {
        self.state = FlagState::AtBase;
    }

    /// Flatten into the wire triple clients expect.
    pub fn view(&self, carrier_head: Option<Point>) -> FlagView {
        FlagView {
            pos: self.position(carrier_head),
            captured: self.is_captured(),
            carrier: self.carrier().cloned(),
            dropped_pos: match self.state {
                FlagState::Dropped(p) => Some(p),
                _ => None,
            },
            base_pos: self.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sets_carrier_and_captured() {
        let mut flag = Flag::new(Point::new(3, 17));
        flag.capture("red1".to_string());
        assert!(flag.is_captured());
        assert!(flag.is_carried_by(&"red1".to_string()));
        assert_eq!(flag.position(Some(Point::new(9, 9))), Point::new(9, 9));
    }

    #[test]
    fn drop_then_return_clears_carrier() {
        let mut flag = Flag::new(Point::new(3, 17));
        flag.capture("red1".to_string());
        flag.drop_at(Point::new(30, 5));
        assert!(!flag.is_captured());
        assert_eq!(flag.carrier(), None);
        assert_eq!(flag.position(None), Point::new(30, 5));
        flag.return_to_base();
        assert_eq!(flag.position(None), Point::new(3, 17));
    }

    #[test]
    fn view_never_reports_contradictory_fields() {
        let mut flag = Flag::new(Point::new(3, 17));
        let v = flag.view(None);
        assert!(!v.captured);
        assert!(v.carrier.is_none());

        flag.capture("x".to_string());
        let v = flag.view(Some(Point::new(1, 1)));
        assert!(v.captured);
        assert_eq!(v.carrier.as_deref(), Some("x"));
        assert!(v.dropped_pos.is_none());
    }
}
