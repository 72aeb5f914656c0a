//! Board entities shared by the game modes.

mod flag;
mod snake;
mod terrain;

pub use flag::{Flag, FlagState};
pub use snake::Snake;
pub use terrain::{obstacle_at, place_obstacles, place_portals, portal_exit, Obstacle};
