//! Gameplay tuning configuration

use serde::Deserialize;

use crate::application::{GameplayOptions, ScoringPolicy};
use crate::domain::game::GameLimits;

use super::error::ValidationError;

/// Gameplay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Number of songs after which the client ends the game
    #[serde(default = "default_max_songs")]
    pub max_songs: u32,

    /// Bound on the retry-until-playable selection loop
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: u32,

    /// Transcript cap per session; oldest turns are evicted past this
    #[serde(default = "default_max_transcript_messages")]
    pub max_transcript_messages: usize,

    /// Scoring strategy: `guess_driven` (default) or `points_driven`
    #[serde(default)]
    pub scoring_policy: ScoringPolicy,
}

impl GameConfig {
    /// Translate into application-layer options.
    pub fn gameplay_options(&self) -> GameplayOptions {
        GameplayOptions {
            limits: GameLimits {
                max_songs: self.max_songs,
                max_transcript_messages: self.max_transcript_messages,
            },
            max_selection_attempts: self.max_selection_attempts,
            scoring_policy: self.scoring_policy,
        }
    }

    /// Validate gameplay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_songs == 0 {
            return Err(ValidationError::InvalidGameLimit("max_songs must be >= 1"));
        }
        if self.max_selection_attempts == 0 {
            return Err(ValidationError::InvalidGameLimit(
                "max_selection_attempts must be >= 1",
            ));
        }
        if self.max_transcript_messages < 2 {
            return Err(ValidationError::InvalidGameLimit(
                "max_transcript_messages must be >= 2",
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_songs: default_max_songs(),
            max_selection_attempts: default_max_selection_attempts(),
            max_transcript_messages: default_max_transcript_messages(),
            scoring_policy: ScoringPolicy::default(),
        }
    }
}

fn default_max_songs() -> u32 {
    5
}

fn default_max_selection_attempts() -> u32 {
    8
}

fn default_max_transcript_messages() -> usize {
    40
}
