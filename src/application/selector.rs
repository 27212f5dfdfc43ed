//! Song selection: the retry-until-playable loop.
//!
//! The oracle is a non-deterministic proposer; novelty and playability are
//! enforced here, not trusted. Each attempt asks for one candidate matching
//! the theme, excluding tracks already played this session and tracks the
//! whole process knows to be unavailable, then confirms playability against
//! the catalog before anything is committed.

use std::sync::Arc;

use crate::domain::game::{GameError, GameSession, PlayableTrack, UnavailableTracks};
use crate::domain::oracle::prompts::{self, ClipReply};
use crate::domain::oracle::ResponseSanitizer;
use crate::ports::{CatalogGateway, ChatMessage, ConversationGateway, GatewayError};

/// A clip confirmed playable, ready to commit onto the session.
#[derive(Debug, Clone)]
pub struct SelectedClip {
    pub track: PlayableTrack,
    pub presenter_text: String,
    /// The user-role request that produced this clip, for the transcript.
    pub request: String,
}

/// Picks the next playable clip for a session.
pub struct SongSelector {
    oracle: Arc<dyn ConversationGateway>,
    catalog: Arc<dyn CatalogGateway>,
    unavailable: UnavailableTracks,
    sanitizer: ResponseSanitizer,
    max_attempts: u32,
}

impl SongSelector {
    pub fn new(
        oracle: Arc<dyn ConversationGateway>,
        catalog: Arc<dyn CatalogGateway>,
        unavailable: UnavailableTracks,
        max_attempts: u32,
    ) -> Self {
        Self {
            oracle,
            catalog,
            unavailable,
            sanitizer: ResponseSanitizer::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Runs the bounded selection loop. Does not mutate the session; the
    /// caller commits the returned clip, so a failed selection leaves the
    /// session untouched.
    ///
    /// # Errors
    ///
    /// - `UpstreamParse` if an oracle reply cannot be parsed or is missing
    ///   the artist/title fields (terminal, not retried)
    /// - `UpstreamUnavailable` if the oracle itself fails
    /// - `SelectionExhausted` when `max_attempts` candidates were all
    ///   duplicates or unplayable
    pub async fn select(&self, session: &GameSession) -> Result<SelectedClip, GameError> {
        for attempt in 1..=self.max_attempts {
            let request = prompts::clip_request(
                session.song_count() + 1,
                &session.history_prompt_list(),
                &self.unavailable.as_prompt_list(),
            );

            let mut transcript: Vec<ChatMessage> =
                session.transcript().iter().map(ChatMessage::from).collect();
            transcript.push(ChatMessage::system(prompts::clip_instruction(
                session.theme(),
            )));
            transcript.push(ChatMessage::user(request.clone()));

            let reply = self.oracle.send(&transcript).await?;
            let clip: ClipReply = self
                .sanitizer
                .parse(&reply)
                .map_err(|e| GameError::upstream_parse(e.to_string()))?;

            let Some(key) = clip.track() else {
                return Err(GameError::upstream_parse(
                    "clip reply is missing artist or title",
                ));
            };

            if session.has_played(&key) {
                tracing::debug!(attempt, track = %key, "oracle proposed an already-played track");
                continue;
            }
            if self.unavailable.contains(&key) {
                tracing::debug!(attempt, track = %key, "oracle proposed a known-unavailable track");
                continue;
            }

            match self.catalog.lookup(&key.artist, &key.title).await {
                Ok(Some(track)) => {
                    tracing::info!(attempt, track = %key, "clip confirmed playable");
                    return Ok(SelectedClip {
                        track,
                        presenter_text: clip.text,
                        request,
                    });
                }
                Ok(None) => {
                    tracing::info!(attempt, track = %key, "track not playable, requesting another");
                    self.unavailable.record(key);
                }
                Err(GatewayError::Timeout { timeout_secs }) => {
                    // Outcome unknown: retry without condemning the track.
                    tracing::warn!(attempt, track = %key, timeout_secs, "catalog lookup timed out");
                }
                Err(err) => {
                    tracing::warn!(attempt, track = %key, error = %err, "catalog lookup failed");
                    self.unavailable.record(key);
                }
            }
        }

        Err(GameError::SelectionExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockConversationGateway;
    use crate::adapters::catalog::MockCatalog;
    use crate::domain::game::{GameId, GameLimits, TrackKey};

    fn clip_reply(artist: &str, title: &str) -> String {
        format!(
            r#"{{"text": "Here we go!", "extract": {{"artist": "{artist}", "title": "{title}"}}}}"#
        )
    }

    fn themed_session() -> GameSession {
        let mut session = GameSession::new(GameId::new(), GameLimits::default());
        session.choose_theme("80s").unwrap();
        session
    }

    fn selector(
        oracle: MockConversationGateway,
        catalog: MockCatalog,
        unavailable: UnavailableTracks,
        max_attempts: u32,
    ) -> SongSelector {
        SongSelector::new(Arc::new(oracle), Arc::new(catalog), unavailable, max_attempts)
    }

    #[tokio::test]
    async fn first_playable_candidate_is_selected() {
        let oracle =
            MockConversationGateway::new().with_reply(clip_reply("Kenny Loggins", "Footloose"));
        let catalog = MockCatalog::new().with_playable("https://preview/footloose");
        let s = selector(oracle, catalog, UnavailableTracks::new(), 8);

        let clip = s.select(&themed_session()).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("Kenny Loggins", "Footloose"));
        assert_eq!(clip.track.preview_url, "https://preview/footloose");
        assert_eq!(clip.presenter_text, "Here we go!");
    }

    #[tokio::test]
    async fn unplayable_candidates_are_recorded_and_retried() {
        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("Artist One", "Song One"))
            .with_reply(clip_reply("Artist Two", "Song Two"))
            .with_reply(clip_reply("Artist Three", "Song Three"));
        let catalog = MockCatalog::new()
            .with_unplayable()
            .with_unplayable()
            .with_playable("https://preview/3");
        let unavailable = UnavailableTracks::new();
        let s = selector(oracle, catalog, unavailable.clone(), 8);

        let clip = s.select(&themed_session()).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("Artist Three", "Song Three"));
        assert!(unavailable.contains(&TrackKey::new("Artist One", "Song One")));
        assert!(unavailable.contains(&TrackKey::new("Artist Two", "Song Two")));
        assert_eq!(unavailable.len(), 2);
    }

    #[tokio::test]
    async fn exhaustion_is_a_terminal_error() {
        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("A", "1"))
            .with_reply(clip_reply("B", "2"));
        let catalog = MockCatalog::new().with_unplayable().with_unplayable();
        let s = selector(oracle, catalog, UnavailableTracks::new(), 2);

        let err = s.select(&themed_session()).await.unwrap_err();
        assert_eq!(err, GameError::SelectionExhausted { attempts: 2 });
    }

    #[tokio::test]
    async fn malformed_reply_aborts_without_retry() {
        let oracle = MockConversationGateway::new().with_reply(r#"{"text": "no extract here"}"#);
        let catalog = MockCatalog::new().with_playable("https://unused");
        let s = selector(oracle, catalog, UnavailableTracks::new(), 8);

        let err = s.select(&themed_session()).await.unwrap_err();
        assert!(matches!(err, GameError::UpstreamParse(_)));
    }

    #[tokio::test]
    async fn unparseable_reply_aborts_without_retry() {
        let oracle = MockConversationGateway::new().with_reply("I refuse to answer in JSON");
        let catalog = MockCatalog::new();
        let s = selector(oracle.clone(), catalog, UnavailableTracks::new(), 8);

        let err = s.select(&themed_session()).await.unwrap_err();
        assert!(matches!(err, GameError::UpstreamParse(_)));
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn known_unavailable_candidates_skip_the_catalog() {
        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("Toto", "Africa"))
            .with_reply(clip_reply("A-ha", "Take On Me"));
        let catalog = MockCatalog::new().with_playable("https://preview/aha");
        let unavailable = UnavailableTracks::new();
        unavailable.record(TrackKey::new("Toto", "Africa"));
        let s = selector(oracle, catalog.clone(), unavailable, 8);

        let clip = s.select(&themed_session()).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("A-ha", "Take On Me"));
        // Only the fresh candidate reached the catalog.
        assert_eq!(catalog.calls(), vec![TrackKey::new("A-ha", "Take On Me")]);
    }

    #[tokio::test]
    async fn already_played_candidates_are_skipped() {
        let mut session = themed_session();
        session
            .commit_song(TrackKey::new("Toto", "Africa"))
            .unwrap();

        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("Toto", "Africa"))
            .with_reply(clip_reply("Queen", "Radio Ga Ga"));
        let catalog = MockCatalog::new().with_playable("https://preview/queen");
        let s = selector(oracle, catalog.clone(), UnavailableTracks::new(), 8);

        let clip = s.select(&session).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("Queen", "Radio Ga Ga"));
        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test]
    async fn catalog_timeout_retries_without_recording() {
        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("Toto", "Africa"))
            .with_reply(clip_reply("Toto", "Africa"));
        let catalog = MockCatalog::new()
            .with_error(GatewayError::Timeout { timeout_secs: 10 })
            .with_playable("https://preview/africa");
        let unavailable = UnavailableTracks::new();
        let s = selector(oracle, catalog, unavailable.clone(), 8);

        let clip = s.select(&themed_session()).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("Toto", "Africa"));
        assert!(unavailable.is_empty());
    }

    #[tokio::test]
    async fn definitive_catalog_failure_marks_unavailable() {
        let oracle = MockConversationGateway::new()
            .with_reply(clip_reply("Toto", "Africa"))
            .with_reply(clip_reply("Queen", "Radio Ga Ga"));
        let catalog = MockCatalog::new()
            .with_error(GatewayError::unavailable("500"))
            .with_playable("https://preview/queen");
        let unavailable = UnavailableTracks::new();
        let s = selector(oracle, catalog, unavailable.clone(), 8);

        let clip = s.select(&themed_session()).await.unwrap();
        assert_eq!(clip.track.key, TrackKey::new("Queen", "Radio Ga Ga"));
        assert!(unavailable.contains(&TrackKey::new("Toto", "Africa")));
    }

    #[tokio::test]
    async fn oracle_failure_propagates() {
        let oracle = MockConversationGateway::new()
            .with_error(GatewayError::unavailable("oracle down"));
        let catalog = MockCatalog::new();
        let s = selector(oracle, catalog, UnavailableTracks::new(), 8);

        let err = s.select(&themed_session()).await.unwrap_err();
        assert!(matches!(err, GameError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn prompt_lists_exclusions() {
        let mut session = themed_session();
        session
            .commit_song(TrackKey::new("Toto", "Africa"))
            .unwrap();
        let unavailable = UnavailableTracks::new();
        unavailable.record(TrackKey::new("A-ha", "Take On Me"));

        let oracle =
            MockConversationGateway::new().with_reply(clip_reply("Queen", "Radio Ga Ga"));
        let catalog = MockCatalog::new().with_playable("https://preview/queen");
        let s = selector(oracle.clone(), catalog, unavailable, 8);

        s.select(&session).await.unwrap();

        let calls = oracle.calls();
        let user_turn = calls[0].last().unwrap();
        assert!(user_turn.content.contains("Toto - Africa"));
        assert!(user_turn.content.contains("A-ha - Take On Me"));
        assert!(user_turn.content.contains("round 2"));
    }
}
