//! Game session aggregate entity.
//!
//! A `GameSession` is the state-machine entity holding one game's progress:
//! theme selection, per-round clip state, partial-guess resolution, and the
//! running conversation transcript with the oracle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::GameError;
use super::track::TrackKey;

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Creates a new random GameId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a GameId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The step a game session is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStep {
    /// Waiting for the player to pick a theme.
    ChooseTheme,
    /// Theme set; no clip has been started yet.
    ThemeChosen,
    /// A clip is active and being guessed.
    PlayClip,
}

/// Which halves of the two-part answer have been confirmed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessedItems {
    pub artist: bool,
    pub title: bool,
}

impl GuessedItems {
    pub fn new(artist: bool, title: bool) -> Self {
        Self { artist, title }
    }

    /// Neither half has been resolved.
    pub fn is_empty(&self) -> bool {
        !self.artist && !self.title
    }

    /// Exactly one half has been resolved.
    pub fn is_partial(&self) -> bool {
        self.artist != self.title
    }

    /// Both halves have been resolved.
    pub fn is_complete(&self) -> bool {
        self.artist && self.title
    }

    /// Combines earlier partial progress with a fresh judgment.
    pub fn merged_with(self, other: GuessedItems) -> Self {
        Self {
            artist: self.artist || other.artist,
            title: self.title || other.title,
        }
    }
}

/// Role of a transcript message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in the oracle conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TranscriptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Per-session limits, sourced from configuration at creation time.
#[derive(Debug, Clone, Copy)]
pub struct GameLimits {
    /// Number of songs after which the client ends the game.
    pub max_songs: u32,
    /// Transcript cap; oldest turns are evicted past this.
    pub max_transcript_messages: usize,
}

impl Default for GameLimits {
    fn default() -> Self {
        Self {
            max_songs: 5,
            max_transcript_messages: 40,
        }
    }
}

/// Game session aggregate.
///
/// # Invariants
///
/// - `theme` is set at most once, only while in `ChooseTheme`
/// - `current_song` is `Some` only while in `PlayClip`
/// - no track appears twice in `song_history`
/// - `points` only ever increases
/// - mutating operations validate before touching any field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    id: GameId,
    step: GameStep,
    theme: String,
    points: u32,
    song_count: u32,
    max_songs: u32,
    current_song: Option<TrackKey>,
    song_history: Vec<TrackKey>,
    guessed_items: GuessedItems,
    transcript: Vec<TranscriptMessage>,
    max_transcript_messages: usize,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Creates a fresh session in the `ChooseTheme` step.
    pub fn new(id: GameId, limits: GameLimits) -> Self {
        Self {
            id,
            step: GameStep::ChooseTheme,
            theme: String::new(),
            points: 0,
            song_count: 0,
            max_songs: limits.max_songs,
            current_song: None,
            song_history: Vec::new(),
            guessed_items: GuessedItems::default(),
            transcript: Vec::new(),
            max_transcript_messages: limits.max_transcript_messages.max(2),
            created_at: Utc::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn step(&self) -> GameStep {
        self.step
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn song_count(&self) -> u32 {
        self.song_count
    }

    pub fn max_songs(&self) -> u32 {
        self.max_songs
    }

    pub fn current_song(&self) -> Option<&TrackKey> {
        self.current_song.as_ref()
    }

    pub fn song_history(&self) -> &[TrackKey] {
        &self.song_history
    }

    pub fn guessed_items(&self) -> GuessedItems {
        self.guessed_items
    }

    pub fn transcript(&self) -> &[TranscriptMessage] {
        &self.transcript
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The active clip, or `InvalidState` when no song is being played.
    pub fn require_current_song(&self) -> Result<&TrackKey, GameError> {
        self.current_song
            .as_ref()
            .ok_or_else(|| GameError::invalid_state("no song is currently being played"))
    }

    pub fn has_played(&self, key: &TrackKey) -> bool {
        self.song_history.iter().any(|t| t == key)
    }

    /// Prompt-friendly list of tracks already played this session.
    pub fn history_prompt_list(&self) -> String {
        self.song_history
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Sets the theme, moving `ChooseTheme` -> `ThemeChosen`.
    ///
    /// Rejected once the session has moved past theme selection; the theme
    /// is set exactly once per session.
    pub fn choose_theme(&mut self, theme: impl Into<String>) -> Result<(), GameError> {
        if self.step != GameStep::ChooseTheme {
            return Err(GameError::invalid_state(
                "theme already chosen for this game",
            ));
        }
        self.theme = theme.into();
        self.step = GameStep::ThemeChosen;
        Ok(())
    }

    /// Validates that a song may be started (theme must precede any song).
    pub fn ensure_can_start_song(&self) -> Result<(), GameError> {
        if self.step == GameStep::ChooseTheme {
            return Err(GameError::invalid_state(
                "a theme must be chosen before starting a song",
            ));
        }
        Ok(())
    }

    /// Commits a confirmed-playable clip as the new round.
    ///
    /// Moves to `PlayClip`, appends to history, bumps the song count and
    /// resets partial-guess state. Rejects duplicates so a track appears in
    /// the history at most once.
    pub fn commit_song(&mut self, track: TrackKey) -> Result<(), GameError> {
        self.ensure_can_start_song()?;
        if self.has_played(&track) {
            return Err(GameError::invalid_state(format!(
                "track already played this game: {}",
                track
            )));
        }
        self.current_song = Some(track.clone());
        self.song_history.push(track);
        self.song_count += 1;
        self.step = GameStep::PlayClip;
        self.guessed_items = GuessedItems::default();
        Ok(())
    }

    /// Records partial-guess progress without scoring.
    pub fn record_partial(&mut self, guessed: GuessedItems) {
        self.guessed_items = guessed;
    }

    /// Finishes the current round's scoring: awards points (possibly zero)
    /// and clears partial-guess state. The step stays `PlayClip`; the next
    /// clip is started by a separate action.
    pub fn resolve_round(&mut self, points_earned: u32) {
        self.points += points_earned;
        self.guessed_items = GuessedItems::default();
    }

    /// Appends one turn to the transcript, evicting the oldest turns when
    /// the cap is exceeded.
    pub fn push_message(&mut self, message: TranscriptMessage) {
        self.transcript.push(message);
        if self.transcript.len() > self.max_transcript_messages {
            let excess = self.transcript.len() - self.max_transcript_messages;
            self.transcript.drain(..excess);
        }
    }
}
