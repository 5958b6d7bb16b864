pub mod board;
pub mod browser;
pub mod core;
pub mod game;
pub mod input;

pub use game::{GameSummary, TurnSync};
