//! Game domain: session state machine, tracks, and error taxonomy.

mod errors;
mod session;
mod track;

pub use errors::GameError;
pub use session::{
    GameId, GameLimits, GameSession, GameStep, GuessedItems, Role, TranscriptMessage,
};
pub use track::{PlayableTrack, TrackKey, UnavailableTracks};
