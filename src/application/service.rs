//! Game orchestration service.
//!
//! One method per inbound action. Each method resolves the session by id,
//! locks it for the duration of the operation (serializing concurrent
//! requests on the same game), performs a single validated state
//! transition, and returns the response payload plus a state snapshot.
//! Transitions either fully commit or abort before mutating the session.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::game::{
    GameError, GameId, GameLimits, GameSession, GameStep, GuessedItems, TrackKey,
    TranscriptMessage, UnavailableTracks,
};
use crate::domain::oracle::prompts::{self, ThemeReply};
use crate::domain::oracle::ResponseSanitizer;
use crate::ports::{CatalogGateway, ChatMessage, ConversationGateway, SessionStore};

use super::evaluator::{AnswerEvaluator, Judgment, JudgmentOutcome, ScoringPolicy};
use super::selector::SongSelector;

/// Tunables for a game service instance.
#[derive(Debug, Clone, Copy)]
pub struct GameplayOptions {
    pub limits: GameLimits,
    /// Bound on the selector's retry-until-playable loop.
    pub max_selection_attempts: u32,
    pub scoring_policy: ScoringPolicy,
}

impl Default for GameplayOptions {
    fn default() -> Self {
        Self {
            limits: GameLimits::default(),
            max_selection_attempts: 8,
            scoring_policy: ScoringPolicy::default(),
        }
    }
}

/// Serializable snapshot of a session, returned with most responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub game_step: GameStep,
    pub theme: String,
    pub points: u32,
    pub song_count: u32,
    pub max_songs: u32,
    pub current_song: Option<TrackKey>,
    pub song_history: Vec<TrackKey>,
    pub guessed_items: GuessedItems,
}

impl From<&GameSession> for GameStateView {
    fn from(session: &GameSession) -> Self {
        Self {
            game_step: session.step(),
            theme: session.theme().to_string(),
            points: session.points(),
            song_count: session.song_count(),
            max_songs: session.max_songs(),
            current_song: session.current_song().cloned(),
            song_history: session.song_history().to_vec(),
            guessed_items: session.guessed_items(),
        }
    }
}

/// Response payloads per action.
#[derive(Debug, Clone)]
pub struct StartedGame {
    pub game_id: GameId,
    pub presenter_text: String,
    pub state: GameStateView,
}

#[derive(Debug, Clone)]
pub struct ChosenTheme {
    pub presenter_text: String,
    pub state: GameStateView,
}

#[derive(Debug, Clone)]
pub struct StartedSong {
    pub presenter_text: String,
    pub track_url: String,
    pub state: GameStateView,
}

#[derive(Debug, Clone)]
pub struct AnsweredGuess {
    pub presenter_text: String,
    pub success: bool,
    pub points: u32,
    pub state: GameStateView,
}

/// The game session orchestrator.
pub struct GameService {
    store: Arc<dyn SessionStore>,
    oracle: Arc<dyn ConversationGateway>,
    selector: SongSelector,
    evaluator: AnswerEvaluator,
    sanitizer: ResponseSanitizer,
    limits: GameLimits,
}

impl GameService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        oracle: Arc<dyn ConversationGateway>,
        catalog: Arc<dyn CatalogGateway>,
        unavailable: UnavailableTracks,
        options: GameplayOptions,
    ) -> Self {
        let selector = SongSelector::new(
            oracle.clone(),
            catalog,
            unavailable,
            options.max_selection_attempts,
        );
        let evaluator = AnswerEvaluator::new(oracle.clone(), options.scoring_policy);

        Self {
            store,
            oracle,
            selector,
            evaluator,
            sanitizer: ResponseSanitizer::new(),
            limits: options.limits,
        }
    }

    /// Creates a session and has the presenter welcome the player.
    ///
    /// The session is registered only after the oracle call succeeds, so a
    /// failed start leaves no orphaned session behind.
    pub async fn start_game(&self) -> Result<StartedGame, GameError> {
        let mut session = GameSession::new(GameId::new(), self.limits);
        session.push_message(TranscriptMessage::user(prompts::welcome_message()));

        let greeting = self.oracle.send(&to_chat(&session)).await?;
        session.push_message(TranscriptMessage::assistant(&greeting));

        let game_id = session.id();
        let state = GameStateView::from(&session);
        self.store.create(session);
        tracing::info!(%game_id, "game started");

        Ok(StartedGame {
            game_id,
            presenter_text: greeting,
            state,
        })
    }

    /// Sets the session theme from the player's free-text choice.
    pub async fn choose_theme(
        &self,
        game_id: GameId,
        theme: &str,
    ) -> Result<ChosenTheme, GameError> {
        let handle = self.session(game_id)?;
        let mut session = handle.lock().await;

        if session.step() != GameStep::ChooseTheme {
            return Err(GameError::invalid_state(
                "theme already chosen for this game",
            ));
        }

        let mut transcript = to_chat(&session);
        transcript.push(ChatMessage::system(prompts::theme_instruction()));
        transcript.push(ChatMessage::user(theme));

        let raw = self.oracle.send(&transcript).await?;
        let reply: ThemeReply = self
            .sanitizer
            .parse(&raw)
            .map_err(|e| GameError::upstream_parse(e.to_string()))?;

        // The oracle may rephrase the theme, or pick one when the player
        // had no idea; fall back to the raw input if it extracted nothing.
        let chosen = if reply.theme.trim().is_empty() {
            theme.to_string()
        } else {
            reply.theme.clone()
        };
        session.choose_theme(chosen)?;
        session.push_message(TranscriptMessage::user(theme));
        session.push_message(TranscriptMessage::assistant(&reply.text));
        tracing::info!(%game_id, theme = session.theme(), "theme chosen");

        Ok(ChosenTheme {
            presenter_text: reply.text,
            state: GameStateView::from(&*session),
        })
    }

    /// Selects and commits the next playable clip.
    pub async fn start_song(&self, game_id: GameId) -> Result<StartedSong, GameError> {
        let handle = self.session(game_id)?;
        let mut session = handle.lock().await;

        session.ensure_can_start_song()?;
        let clip = self.selector.select(&session).await?;

        session.commit_song(clip.track.key.clone())?;
        session.push_message(TranscriptMessage::user(clip.request));
        session.push_message(TranscriptMessage::assistant(&clip.presenter_text));
        tracing::info!(
            %game_id,
            track = %clip.track.key,
            round = session.song_count(),
            "clip committed"
        );

        Ok(StartedSong {
            presenter_text: clip.presenter_text,
            track_url: clip.track.preview_url,
            state: GameStateView::from(&*session),
        })
    }

    /// Judges a guess for the current clip.
    pub async fn guess_answer(
        &self,
        game_id: GameId,
        user_answer: &str,
    ) -> Result<AnsweredGuess, GameError> {
        let handle = self.session(game_id)?;
        let mut session = handle.lock().await;

        let judgment = self.evaluator.evaluate_guess(&session, user_answer).await?;
        Ok(self.apply_judgment(&mut session, user_answer, judgment))
    }

    /// Judges the supplementary guess of a partially-solved round.
    pub async fn complete_answer(
        &self,
        game_id: GameId,
        user_answer: &str,
    ) -> Result<AnsweredGuess, GameError> {
        let handle = self.session(game_id)?;
        let mut session = handle.lock().await;

        let judgment = self
            .evaluator
            .evaluate_completion(&session, user_answer)
            .await?;
        Ok(self.apply_judgment(&mut session, user_answer, judgment))
    }

    /// Returns the session's conversation transcript.
    pub async fn message_history(
        &self,
        game_id: GameId,
    ) -> Result<Vec<TranscriptMessage>, GameError> {
        let handle = self.session(game_id)?;
        let session = handle.lock().await;
        Ok(session.transcript().to_vec())
    }

    /// Discards a session.
    pub fn end_game(&self, game_id: GameId) -> Result<(), GameError> {
        if self.store.delete(game_id) {
            tracing::info!(%game_id, "game ended");
            Ok(())
        } else {
            Err(GameError::NotFound(game_id))
        }
    }

    fn session(&self, game_id: GameId) -> Result<crate::ports::SessionHandle, GameError> {
        self.store.get(game_id).ok_or(GameError::NotFound(game_id))
    }

    fn apply_judgment(
        &self,
        session: &mut GameSession,
        user_answer: &str,
        judgment: Judgment,
    ) -> AnsweredGuess {
        match judgment.outcome {
            JudgmentOutcome::Resolved => session.resolve_round(judgment.points_delta),
            JudgmentOutcome::Partial(guessed) => session.record_partial(guessed),
            JudgmentOutcome::NoChange => {}
        }
        session.push_message(TranscriptMessage::user(user_answer));
        session.push_message(TranscriptMessage::assistant(&judgment.presenter_text));

        AnsweredGuess {
            presenter_text: judgment.presenter_text,
            success: judgment.success,
            points: session.points(),
            state: GameStateView::from(&*session),
        }
    }
}

fn to_chat(session: &GameSession) -> Vec<ChatMessage> {
    session.transcript().iter().map(ChatMessage::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockConversationGateway;
    use crate::adapters::catalog::MockCatalog;
    use crate::adapters::store::InMemorySessionStore;

    fn service(oracle: MockConversationGateway, catalog: MockCatalog) -> GameService {
        GameService::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(oracle),
            Arc::new(catalog),
            UnavailableTracks::new(),
            GameplayOptions::default(),
        )
    }

    #[tokio::test]
    async fn start_game_registers_a_fresh_session() {
        let oracle = MockConversationGateway::new().with_reply("Welcome! Pick a theme!");
        let s = service(oracle, MockCatalog::new());

        let started = s.start_game().await.unwrap();
        assert_eq!(started.presenter_text, "Welcome! Pick a theme!");
        assert_eq!(started.state.game_step, GameStep::ChooseTheme);
        assert_eq!(started.state.points, 0);

        let history = s.message_history(started.game_id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn start_game_failure_leaves_no_session() {
        let oracle = MockConversationGateway::new()
            .with_error(crate::ports::GatewayError::unavailable("down"));
        let store = Arc::new(InMemorySessionStore::new());
        let s = GameService::new(
            store.clone(),
            Arc::new(oracle),
            Arc::new(MockCatalog::new()),
            UnavailableTracks::new(),
            GameplayOptions::default(),
        );

        assert!(s.start_game().await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn choose_theme_twice_is_invalid_state() {
        let oracle = MockConversationGateway::new()
            .with_reply("Welcome!")
            .with_reply(r#"{"text": "The 80s, great!", "theme": "80s"}"#);
        let s = service(oracle, MockCatalog::new());

        let started = s.start_game().await.unwrap();
        let chosen = s.choose_theme(started.game_id, "80s").await.unwrap();
        assert_eq!(chosen.state.game_step, GameStep::ThemeChosen);
        assert_eq!(chosen.state.theme, "80s");

        let err = s.choose_theme(started.game_id, "90s").await.unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[tokio::test]
    async fn choose_theme_falls_back_to_player_input() {
        let oracle = MockConversationGateway::new()
            .with_reply("Welcome!")
            .with_reply(r#"{"text": "Alright!"}"#);
        let s = service(oracle, MockCatalog::new());

        let started = s.start_game().await.unwrap();
        let chosen = s.choose_theme(started.game_id, "french rap").await.unwrap();
        assert_eq!(chosen.state.theme, "french rap");
    }

    #[tokio::test]
    async fn unknown_game_id_is_not_found() {
        let s = service(MockConversationGateway::new(), MockCatalog::new());
        let id = GameId::new();

        assert!(matches!(
            s.choose_theme(id, "80s").await.unwrap_err(),
            GameError::NotFound(_)
        ));
        assert!(matches!(
            s.message_history(id).await.unwrap_err(),
            GameError::NotFound(_)
        ));
        assert!(matches!(s.end_game(id).unwrap_err(), GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn start_song_before_theme_is_rejected() {
        let oracle = MockConversationGateway::new().with_reply("Welcome!");
        let s = service(oracle, MockCatalog::new());

        let started = s.start_game().await.unwrap();
        let err = s.start_song(started.game_id).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[tokio::test]
    async fn end_game_deletes_the_session() {
        let oracle = MockConversationGateway::new().with_reply("Welcome!");
        let s = service(oracle, MockCatalog::new());

        let started = s.start_game().await.unwrap();
        s.end_game(started.game_id).unwrap();
        assert!(matches!(
            s.message_history(started.game_id).await.unwrap_err(),
            GameError::NotFound(_)
        ));
    }
}
