//! Warden GameState - Run Outcome Tracking
//!
//! This crate tracks a single run: whether it is still being played, won
//! or lost, how long it has lasted and the best winning time so far.
//!
//! # Example
//!
//! ```ignore
//! use warden_gamestate::prelude::*;
//!
//! let mut session = GameSession::new();
//! session.tick(dt);
//! if player_reached_goal {
//!     session.win();
//! }
//! let hud = HudText::from_session(&session);
//! ```

pub mod hud;
pub mod session;

pub mod prelude {
    pub use crate::hud::{format_seconds, HudText};
    pub use crate::session::{GameSession, Outcome, SessionSignal, SessionTransition};
}

pub use prelude::*;
