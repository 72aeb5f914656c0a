//! Authoritative multiplayer snake game server library.

pub mod board;
pub mod config;
pub mod entity;
pub mod error;
pub mod modes;
pub mod movement;
pub mod powerup;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::RejectedInput;
pub use server::{run, GameState, TargetedMessage};
