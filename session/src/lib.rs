//! Bowling session core.
//!
//! Owns the lanes of one local bowler and any imitation opponents, turns
//! pointer gestures into throws and scores every settled ball.

pub mod assets;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod gesture;
pub mod imitation;
pub mod lane;
pub mod physics;
pub mod player;
pub mod state;
pub mod view;
