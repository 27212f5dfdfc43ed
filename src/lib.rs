//! Blindtest - AI-hosted music trivia game backend
//!
//! This crate implements the game session orchestrator for a turn-based,
//! AI-narrated blind test: theme selection, playable-clip selection against
//! an external catalog, and multi-stage answer scoring.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
