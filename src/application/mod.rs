//! Application layer: orchestration of domain logic over the ports.

mod evaluator;
mod selector;
mod service;

pub use evaluator::{AnswerEvaluator, Judgment, JudgmentOutcome, ScoringPolicy};
pub use selector::{SelectedClip, SongSelector};
pub use service::{
    AnsweredGuess, ChosenTheme, GameService, GameStateView, GameplayOptions, StartedGame,
    StartedSong,
};
