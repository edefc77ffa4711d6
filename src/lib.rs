//! A depth-limited game tree search agent for the board game 'Connect 4'
//!
//! The agent looks a fixed number of plies ahead with negamax-style
//! alpha-beta search and scores the positions at the horizon by counting
//! every window of four slots ("quartet") on the rack.
//!
//! # Basic Usage
//!
//! ```
//! use quartet::{player::ComputerPlayer, rack::{Player, Rack}};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut rack = Rack::new(7, 6)?;
//! let ai = ComputerPlayer::new(Player::One, 1);
//!
//! assert_eq!(ai.pick_move(&mut rack)?, 3);
//!# Ok(())
//!# }
//! ```
//!
//! # Concurrency
//! A search borrows the rack mutably for its whole duration and leaves it
//! unchanged when it returns. A `ComputerPlayer` holds no board state, so one
//! engine can serve several threads as long as each thread searches its own
//! `Rack`.

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod rack;

pub mod evaluation;

pub mod player;

pub mod game;

mod test;

pub use error::RackError;

/// The default width of the rack in columns
pub const DEFAULT_WIDTH: usize = 7;

/// The default height of the rack in rows
pub const DEFAULT_HEIGHT: usize = 6;

/// The default number of plies searched before falling back to evaluation
pub const DEFAULT_DIFFICULTY: usize = 4;

// a default rack must be able to hold a quartet in every direction
const_assert!(DEFAULT_WIDTH >= 4 && DEFAULT_HEIGHT >= 4);
const_assert!(DEFAULT_DIFFICULTY >= 1);
