//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `game` - Game session aggregate, state machine, tracks and error taxonomy
//! - `oracle` - Oracle reply sanitization, prompt builders and reply schemas

pub mod game;
pub mod oracle;
